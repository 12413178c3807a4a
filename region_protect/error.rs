// Copyright 2025 The Pigweed Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

/// Errors returned while building a region partition.
///
/// The codes follow Pigweed status semantics.  None of them is recoverable at
/// boot: the target entry point halts the core on any of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    /// A range cannot be expressed with the requested addressing mode.
    InvalidArgument = 3,
    /// An area or the whole bank has no slot left for another entry.
    ResourceExhausted = 8,
    /// A boundary marker lies outside the area it splits.
    OutOfRange = 11,
}

pub type Result<T> = core::result::Result<T, Error>;
