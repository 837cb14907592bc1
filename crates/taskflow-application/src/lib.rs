//! Taskflow Application Layer
//!
//! Implements the approval and milestone use cases by orchestrating domain
//! aggregates, the engines and the repository ports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Application Layer                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Services            │ DTOs                       │ Throttling          │
//! │  ApprovalService     │ CreateApprovalTaskCommand  │ RateLimiter         │
//! │  MilestoneService    │ CreateMilestoneCommand     │ TokenBucket         │
//! │  TaskflowServices    │ ApproverInput              │ Unlimited           │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │ depends on
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                                     │
//! │  Aggregates, Engines, Value Objects, Activity Log, Repository Traits    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Responsibilities
//!
//! - **Use Case Orchestration**: load, apply one engine operation, save
//! - **Boundary Normalization**: raw role claims become a single `Role`
//! - **Throttling**: per-actor creation limits through an injected limiter
//!
//! The services trust the actor they are given. Authentication and
//! organizational permission checks happen before a service is called.

pub mod dto;
pub mod errors;
pub mod rate_limit;
pub mod services;

pub use dto::*;
pub use errors::{ApplicationError, ApplicationResult};
pub use rate_limit::{RateLimiter, TokenBucketRateLimiter, UnlimitedRateLimiter};
pub use services::*;
