//! Compile-time markers for the builder
//!
//! Each required builder field gets a set/unset marker pair, so a builder
//! missing its URL or router simply has no `build()` method.

use std::marker::PhantomData;

pub trait UrlState {}

/// No endpoint configured yet
pub struct NoUrl;
impl UrlState for NoUrl {}

/// Endpoint configured
pub struct HasUrl;
impl UrlState for HasUrl {}

pub trait RouterState {}

/// No router configured yet
pub struct NoRouter;
impl RouterState for NoRouter {}

/// Router configured
pub struct HasRouter;
impl RouterState for HasRouter {}

/// Zero-sized carrier for the two marker parameters
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U, R> {
    _url: PhantomData<U>,
    _router: PhantomData<R>,
}

impl<U, R> TypeState<U, R> {
    pub(crate) fn new() -> Self {
        Self {
            _url: PhantomData,
            _router: PhantomData,
        }
    }
}

impl<U, R> Default for TypeState<U, R> {
    fn default() -> Self {
        Self::new()
    }
}
