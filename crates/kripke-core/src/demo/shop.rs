// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Demo order/shipper pair: a request/response protocol with a temporal
//! response property.
//!
//! The `Order` machine walks Pending → Paid and, while Paid, asks the
//! `Shipper` for fulfilment; the shipper confirms and the order moves to
//! Shipped. The shipped rule ("whenever Paid, eventually Shipped") holds on
//! this variant and is exercised by the integration tests.
use crate::checker::Checker;
use crate::event::{Event, UserEvent};
use crate::ident::MachineId;
use crate::machine::Machine;
use crate::mutator::Mutator;
use crate::property::{whenever_eventually, TemporalRule};
use crate::spec::{MachineSpec, MachineSpecBuilder, SpecErrors};
use crate::value::{Record, Value};
use crate::world::World;

/// Type tag of the demo order machine.
pub const ORDER_TAG: &str = "Order";

/// Type tag of the demo shipper machine.
pub const SHIPPER_TAG: &str = "Shipper";

/// Event the order sends to the shipper while Paid.
pub const SHIP_REQUEST_EVENT: &str = "ShipRequest";

/// Event the shipper sends back to the order.
pub const SHIP_CONFIRM_EVENT: &str = "ShipConfirm";

fn order_entry_pending(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    let Some(paid) = m.state_id("Paid") else {
        return;
    };
    mx.goto(paid);
}

fn order_entry_paid(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    let Some(Value::MachineRef(shipper)) = m.field("shipper") else {
        return;
    };
    let payload = Record::new().field("order", Value::MachineRef(m.id()));
    mx.send_to(
        *shipper,
        UserEvent::new(SHIP_REQUEST_EVENT, Value::Record(payload)),
    );
}

fn order_on_confirm(mx: &mut Mutator, _ev: &Event, m: &Machine) {
    let Some(shipped) = m.state_id("Shipped") else {
        return;
    };
    mx.goto(shipped);
}

fn shipper_on_request(mx: &mut Mutator, ev: &Event, _m: &Machine) {
    let Some(Value::Record(payload)) = ev.payload() else {
        return;
    };
    let Some(Value::MachineRef(order)) = payload.get("order") else {
        return;
    };
    mx.send_to(*order, UserEvent::new(SHIP_CONFIRM_EVENT, Value::unit()));
}

/// Spec for the demo order machine. `shipper` must be the [`MachineId`] of a
/// machine built from [`shipper_spec`] in the same world.
#[must_use]
pub fn order_spec(shipper: MachineId) -> MachineSpecBuilder {
    MachineSpec::builder(ORDER_TAG)
        .state("Pending")
        .state("Paid")
        .state("Shipped")
        .field("shipper", Value::MachineRef(shipper))
        .on_entry("Pending", order_entry_pending)
        .on_entry("Paid", order_entry_paid)
        .on_event("Paid", SHIP_CONFIRM_EVENT, order_on_confirm)
}

/// Spec for the demo shipper machine.
#[must_use]
pub fn shipper_spec() -> MachineSpecBuilder {
    MachineSpec::builder(SHIPPER_TAG)
        .state("Ready")
        .on_event("Ready", SHIP_REQUEST_EVENT, shipper_on_request)
}

fn order_paid(world: &World) -> bool {
    world
        .machines()
        .iter()
        .any(|m| m.type_tag() == ORDER_TAG && m.state_name() == "Paid")
}

fn order_shipped(world: &World) -> bool {
    world
        .machines()
        .iter()
        .any(|m| m.type_tag() == ORDER_TAG && m.state_name() == "Shipped")
}

/// The demo response rule: whenever the order is Paid, it is eventually
/// Shipped.
#[must_use]
pub fn paid_eventually_shipped() -> TemporalRule {
    whenever_eventually("paid eventually shipped", order_paid, order_shipped)
}

/// Builds the full demo checker: order at index 0, shipper at index 1, plus
/// the shipped rule.
pub fn build_shop_checker() -> Result<Checker, SpecErrors> {
    let order = order_spec(MachineId::from_raw(1)).freeze()?;
    let shipper = shipper_spec().freeze()?;
    Ok(Checker::new(vec![order, shipper]).rule(paid_eventually_shipped()))
}
