// SPDX-License-Identifier: Apache-2.0

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod comments;
mod convert;
pub(crate) mod extract;
pub(crate) mod guard;
pub(crate) mod health;
pub(crate) mod projects;
pub(crate) mod tasks;
pub(crate) mod users;
