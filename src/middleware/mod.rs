// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (session context, activity tracking).

pub mod session;
pub mod tracking;

pub use session::{ensure_session, RequestId, SessionId};
pub use tracking::track_activity;
