//! Order status lifecycle.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──complete──▶ completed
//!    │  ╲                 │
//!    │   ╲──accept──▶─────┤ (rider assigned)
//!    └──cancel/expire──▶ cancelled ◀──cancel/expire──┘
//! ```
//!
//! `completed` and `cancelled` are terminal.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub const INITIAL: OrderStatus = OrderStatus::Pending;

    /// Orders still waiting on the farm or a rider.
    pub const ACTIVE: [OrderStatus; 2] = [OrderStatus::Pending, OrderStatus::Confirmed];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    #[sea_orm(string_value = "cash_on_delivery")]
    CashOnDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Confirm,
    Complete,
    Cancel,
    Accept,
    Expire,
}

impl OrderAction {
    /// States this action may start from.
    pub fn sources(self) -> &'static [OrderStatus] {
        match self {
            OrderAction::Confirm => &[OrderStatus::Pending],
            OrderAction::Complete => &[OrderStatus::Confirmed],
            OrderAction::Cancel | OrderAction::Accept | OrderAction::Expire => &OrderStatus::ACTIVE,
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            OrderAction::Confirm | OrderAction::Accept => OrderStatus::Confirmed,
            OrderAction::Complete => OrderStatus::Completed,
            OrderAction::Cancel | OrderAction::Expire => OrderStatus::Cancelled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderAction::Confirm => "confirm",
            OrderAction::Complete => "complete",
            OrderAction::Cancel => "cancel",
            OrderAction::Accept => "accept",
            OrderAction::Expire => "expire",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is driving a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Consumer user id. Consumers only create orders, no transition accepts them.
    Consumer(Uuid),
    /// Farmer profile id.
    Farmer(Uuid),
    /// Delivery profile id.
    DeliveryRider(Uuid),
    /// Expiry cleanup, carrying whether the order's product has expired.
    System { product_expired: bool },
}

/// The parts of an order the lifecycle rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderState {
    pub status: OrderStatus,
    pub farmer_id: Uuid,
    pub delivery_boy_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub assign_rider: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} an order that is {from}: {reason}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub action: OrderAction,
    pub reason: &'static str,
}

/// Checks `action` by `actor` against the transition table and returns the resulting move.
pub fn transition(order: &OrderState, actor: Actor, action: OrderAction) -> Result<Transition, TransitionError> {
    let reject = |reason| TransitionError {
        from: order.status,
        action,
        reason,
    };

    let assign_rider = match (actor, action) {
        (Actor::Farmer(farmer_id), OrderAction::Confirm | OrderAction::Complete | OrderAction::Cancel) => {
            if order.farmer_id != farmer_id {
                return Err(reject("order belongs to another farm"));
            }
            None
        }
        (Actor::DeliveryRider(rider_id), OrderAction::Accept) => {
            if order.delivery_boy_id.is_some() {
                return Err(reject("order already has a rider"));
            }
            Some(rider_id)
        }
        (Actor::System { product_expired }, OrderAction::Expire) => {
            if !product_expired {
                return Err(reject("product has not expired"));
            }
            None
        }
        _ => return Err(reject("actor may not perform this action")),
    };

    if !action.sources().contains(&order.status) {
        return Err(reject("not allowed from the current status"));
    }

    Ok(Transition {
        from: order.status,
        to: action.target(),
        assign_rider,
    })
}

/// Decimal places kept for prices and totals (`NUMERIC(12,2)`).
pub const AMOUNT_SCALE: u32 = 2;

/// Largest price or order total the store can hold: 9 999 999 999.99.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, AMOUNT_SCALE)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),
    #[error("product has expired")]
    Expired,
    #[error("requested {requested} but only {available} available")]
    InsufficientStock { requested: i32, available: i32 },
    #[error("order total exceeds {}", max_amount())]
    TotalTooLarge,
}

/// Validates a new order against the product's stock and expiry and returns the frozen total.
pub fn price_order(
    price: Decimal,
    quantity_available: i32,
    expiration_date: DateTime<Utc>,
    quantity: i32,
    now: DateTime<Utc>,
) -> Result<Decimal, PlacementError> {
    if quantity < 1 {
        return Err(PlacementError::InvalidQuantity(quantity));
    }
    if expiration_date <= now {
        return Err(PlacementError::Expired);
    }
    if quantity > quantity_available {
        return Err(PlacementError::InsufficientStock {
            requested: quantity,
            available: quantity_available,
        });
    }
    price
        .checked_mul(Decimal::from(quantity))
        .filter(|total| *total <= max_amount())
        .ok_or(PlacementError::TotalTooLarge)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::Iterable;

    use super::*;

    const ACTIONS: [OrderAction; 5] = [
        OrderAction::Confirm,
        OrderAction::Complete,
        OrderAction::Cancel,
        OrderAction::Accept,
        OrderAction::Expire,
    ];

    fn order(status: OrderStatus, farmer_id: Uuid) -> OrderState {
        OrderState {
            status,
            farmer_id,
            delivery_boy_id: None,
        }
    }

    #[test]
    fn test_active_orders_are_the_cancellable_ones() {
        for status in OrderStatus::iter() {
            assert_eq!(OrderStatus::ACTIVE.contains(&status), !status.is_terminal(), "{status}");
        }
        assert_eq!(OrderAction::Cancel.sources(), OrderStatus::ACTIVE.as_slice());
    }

    #[test]
    fn test_farmer_happy_path() {
        let farm = Uuid::new_v4();
        let mut state = order(OrderStatus::INITIAL, farm);

        let t = transition(&state, Actor::Farmer(farm), OrderAction::Confirm).unwrap();
        assert_eq!((t.from, t.to), (OrderStatus::Pending, OrderStatus::Confirmed));
        state.status = t.to;

        let t = transition(&state, Actor::Farmer(farm), OrderAction::Complete).unwrap();
        assert_eq!(t.to, OrderStatus::Completed);
        assert_eq!(t.assign_rider, None);
    }

    #[test]
    fn test_farmer_cancel_from_active_states() {
        let farm = Uuid::new_v4();
        for status in [OrderStatus::Pending, OrderStatus::Confirmed] {
            let t = transition(&order(status, farm), Actor::Farmer(farm), OrderAction::Cancel).unwrap();
            assert_eq!(t.to, OrderStatus::Cancelled);
        }
    }

    #[test]
    fn test_other_farm_is_rejected() {
        let err = transition(
            &order(OrderStatus::Pending, Uuid::new_v4()),
            Actor::Farmer(Uuid::new_v4()),
            OrderAction::Confirm,
        )
        .unwrap_err();
        assert_eq!(err.from, OrderStatus::Pending);
        assert_eq!(err.action, OrderAction::Confirm);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        let farm = Uuid::new_v4();
        let rider = Uuid::new_v4();
        for status in OrderStatus::iter().filter(|s| s.is_terminal()) {
            let state = order(status, farm);
            for action in ACTIONS {
                for actor in [
                    Actor::Farmer(farm),
                    Actor::DeliveryRider(rider),
                    Actor::System { product_expired: true },
                ] {
                    assert!(
                        transition(&state, actor, action).is_err(),
                        "{actor:?} could {action} from {status}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_confirm_requires_pending_and_complete_requires_confirmed() {
        let farm = Uuid::new_v4();
        assert!(transition(&order(OrderStatus::Confirmed, farm), Actor::Farmer(farm), OrderAction::Confirm).is_err());
        assert!(transition(&order(OrderStatus::Pending, farm), Actor::Farmer(farm), OrderAction::Complete).is_err());
    }

    #[test]
    fn test_rider_accept_assigns_and_confirms() {
        let rider = Uuid::new_v4();
        for status in [OrderStatus::Pending, OrderStatus::Confirmed] {
            let t = transition(&order(status, Uuid::new_v4()), Actor::DeliveryRider(rider), OrderAction::Accept)
                .unwrap();
            assert_eq!(t.to, OrderStatus::Confirmed);
            assert_eq!(t.assign_rider, Some(rider));
        }
    }

    #[test]
    fn test_rider_cannot_take_assigned_order() {
        let mut state = order(OrderStatus::Pending, Uuid::new_v4());
        state.delivery_boy_id = Some(Uuid::new_v4());
        assert!(transition(&state, Actor::DeliveryRider(Uuid::new_v4()), OrderAction::Accept).is_err());
    }

    #[test]
    fn test_actor_action_mismatch_is_rejected() {
        let farm = Uuid::new_v4();
        let state = order(OrderStatus::Pending, farm);
        assert!(transition(&state, Actor::Farmer(farm), OrderAction::Accept).is_err());
        assert!(transition(&state, Actor::Farmer(farm), OrderAction::Expire).is_err());
        assert!(transition(&state, Actor::DeliveryRider(Uuid::new_v4()), OrderAction::Cancel).is_err());
        assert!(transition(&state, Actor::System { product_expired: true }, OrderAction::Cancel).is_err());
        for action in ACTIONS {
            assert!(transition(&state, Actor::Consumer(Uuid::new_v4()), action).is_err());
        }
    }

    #[test]
    fn test_expire_needs_expired_product() {
        let state = order(OrderStatus::Confirmed, Uuid::new_v4());
        assert!(transition(&state, Actor::System { product_expired: false }, OrderAction::Expire).is_err());
        let t = transition(&state, Actor::System { product_expired: true }, OrderAction::Expire).unwrap();
        assert_eq!(t.to, OrderStatus::Cancelled);
    }

    #[test]
    fn test_price_order_freezes_total() {
        let now = Utc::now();
        let total = price_order(Decimal::from(50), 10, now + Duration::days(2), 3, now).unwrap();
        assert_eq!(total, Decimal::from(150));
    }

    #[test]
    fn test_price_order_rejections() {
        let now = Utc::now();
        let tomorrow = now + Duration::days(1);
        assert_eq!(
            price_order(Decimal::from(50), 10, tomorrow, 0, now),
            Err(PlacementError::InvalidQuantity(0))
        );
        assert_eq!(
            price_order(Decimal::from(50), 10, tomorrow, 11, now),
            Err(PlacementError::InsufficientStock {
                requested: 11,
                available: 10
            })
        );
        assert_eq!(price_order(Decimal::from(50), 10, now, 1, now), Err(PlacementError::Expired));
        assert!(price_order(Decimal::from(50), 10, tomorrow, 10, now).is_ok());
    }

    #[test]
    fn test_price_order_total_must_fit_the_amount_column() {
        let now = Utc::now();
        let tomorrow = now + Duration::days(1);
        assert_eq!(
            price_order(max_amount(), i32::MAX, tomorrow, 2, now),
            Err(PlacementError::TotalTooLarge)
        );
        assert_eq!(price_order(max_amount(), i32::MAX, tomorrow, 1, now), Ok(max_amount()));
    }
}
