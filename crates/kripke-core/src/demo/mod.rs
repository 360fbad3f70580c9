// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Demo machines showcasing checker capabilities (e.g., the shop pair).

mod shop;

pub use shop::{
    build_shop_checker, order_spec, paid_eventually_shipped, shipper_spec, ORDER_TAG,
    SHIPPER_TAG, SHIP_CONFIRM_EVENT, SHIP_REQUEST_EVENT,
};
