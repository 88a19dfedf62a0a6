// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identifier.

crate::string_id! {
    /// Unique identifier for a worker node, chosen by the worker itself
    /// at registration time.
    pub struct WorkerId;
}
