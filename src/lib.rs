//! airtrack library: 802.11 frame decoding and live device views.
//!
//! The decoding layer (`frame`, `crypto`, `iapp`, `capture`, `config`,
//! `protocol`) is `no_std` with no allocator, so it runs inside a capture
//! callback on any host. The tracking layer (`view`, `workers`, `endpoint`)
//! needs threads and shared ownership and sits behind the `std` feature,
//! which is on by default.
//!
//! A capture source feeds raw frames to [`capture::observe_frame`]; the
//! tracker turns observations into devices and pushes them through each
//! [`view::DeviceView`], which keeps its own membership current and serves
//! paged key lists to clients.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod capture;
pub mod config;
pub mod crypto;
pub mod frame;
pub mod iapp;
pub mod protocol;

#[cfg(feature = "std")]
pub mod endpoint;
#[cfg(feature = "std")]
pub mod view;
#[cfg(feature = "std")]
pub mod workers;
