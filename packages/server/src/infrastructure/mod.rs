//! Infrastructure layer: the live hub, persistence, auth and wire DTOs.

pub mod auth;
pub mod dto;
pub mod hub;
pub mod repository;
