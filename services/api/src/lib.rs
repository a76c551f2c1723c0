//! Video-sharing platform API
//!
//! REST backend for users, videos, comments, likes, subscriptions,
//! playlists, and tweets over PostgreSQL.

pub mod error;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;
pub mod validation;
