//! GraphQL type definitions.

use async_graphql::{EmptyMutation, EmptySubscription, Schema};

use crate::schema::TrackerQuery;

/// The Tracker GraphQL schema type.
pub type TrackerSchema = Schema<TrackerQuery, EmptyMutation, EmptySubscription>;
