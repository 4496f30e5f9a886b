// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger mutations.
//!
//! These functions write rows only. Callers must invoke them inside an
//! immediate transaction together with the reads they depend on.

pub mod reservations;
pub mod transitions;
