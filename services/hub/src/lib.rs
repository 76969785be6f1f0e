//! Study Hub service
//!
//! A study-group web application: accounts, a single global chat room
//! delivered over WebSocket, and a shared library of uploaded study
//! materials. [`routes::create_router`] assembles everything into an axum
//! router over an [`state::AppState`].

pub mod config;
pub mod ctx;
pub mod error;
pub mod flash;
pub mod identity;
pub mod materials;
pub mod messaging;
pub mod models;
pub mod password;
pub mod realtime;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod uploads;
pub mod validation;
pub mod views;
