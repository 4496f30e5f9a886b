// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only ledger queries.
//!
//! Every query uses Diesel DSL. Callers that need a consistent read-then-write
//! run these inside the same immediate transaction as the write.

pub mod reservations;
pub mod transitions;
