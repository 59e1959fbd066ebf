//! iLab Core
//!
//! Core types shared by the pipeline server client and the verification harness.
//!
//! This crate contains:
//! - Domain types: pipelines, runs, run status and parameter bags
//! - DTOs: request/response bodies of the pipeline server API (KFP v2beta1)

pub mod domain;
pub mod dto;
