// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side queries.
//!
//! Every query takes the connection it runs on, so the same function serves
//! both transactional store access and the seeding helpers.

pub mod activity;
pub mod rides;
pub mod users;
pub mod vehicles;
