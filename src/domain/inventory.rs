//! Tier inventory: all-or-nothing reservation and release.
//!
//! [`reserve`] runs in two phases. The check phase merges the requested
//! line items per tier and validates every one of them against the
//! current counters without touching them. Only when every tier passes
//! does the commit phase decrement the counters. A failing purchase
//! therefore leaves the event exactly as it found it.
//!
//! These functions are synchronous and lock-free; callers must hold the
//! event's write lock (see [`super::EventRegistry`]) so that check and
//! commit observe the same counters.

use serde::Deserialize;
use utoipa::ToSchema;

use super::event::TicketTier;
use super::ticket::TierSnapshot;
use super::{EventId, TierId};
use crate::error::TicketingError;

/// A requested quantity of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub struct LineItem {
    /// Tier to buy from.
    pub tier_id: TierId,
    /// Number of tickets.
    pub quantity: u32,
}

/// Outcome of a successful [`reserve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// One snapshot per distinct tier, in first-appearance order.
    pub items: Vec<TierSnapshot>,
    /// Total admissions.
    pub quantity: u32,
    /// Total price in minor units.
    pub total_cents: u64,
}

/// Validates `items` against `tiers` and, if every line can be honored,
/// decrements the counters.
///
/// `default_limit` is the per-order cap applied to tiers without their
/// own `max_per_order`.
///
/// # Errors
///
/// - [`TicketingError::InvalidRequest`] for an empty order, a zero
///   quantity, or arithmetic overflow.
/// - [`TicketingError::TierNotFound`] for a tier not on the event.
/// - [`TicketingError::OrderLimitExceeded`] when a tier's cap is exceeded.
/// - [`TicketingError::InsufficientInventory`] when a tier would be
///   oversold.
///
/// No counter is modified when an error is returned.
pub fn reserve(
    event_id: EventId,
    tiers: &mut [TicketTier],
    items: &[LineItem],
    default_limit: u32,
) -> Result<Reservation, TicketingError> {
    let requests = merge_line_items(items)?;

    // Check phase: resolve every tier and price the order.
    let mut plan: Vec<(usize, TierSnapshot)> = Vec::with_capacity(requests.len());
    let mut quantity: u32 = 0;
    let mut total_cents: u64 = 0;
    for (tier_id, requested) in requests {
        let (index, tier) = tiers
            .iter()
            .enumerate()
            .find(|(_, t)| t.id == tier_id)
            .ok_or(TicketingError::TierNotFound { event_id, tier_id })?;

        let limit = tier.max_per_order.unwrap_or(default_limit);
        if requested > limit {
            return Err(TicketingError::OrderLimitExceeded {
                tier_name: tier.name.clone(),
                requested,
                limit,
            });
        }
        if requested > tier.remaining {
            return Err(TicketingError::InsufficientInventory {
                tier_id,
                tier_name: tier.name.clone(),
                requested,
                remaining: tier.remaining,
            });
        }

        let subtotal_cents = tier
            .price_cents
            .checked_mul(u64::from(requested))
            .ok_or_else(overflow)?;
        total_cents = total_cents.checked_add(subtotal_cents).ok_or_else(overflow)?;
        quantity = quantity.checked_add(requested).ok_or_else(overflow)?;

        plan.push((
            index,
            TierSnapshot {
                tier_id,
                tier_name: tier.name.clone(),
                unit_price_cents: tier.price_cents,
                quantity: requested,
                subtotal_cents,
            },
        ));
    }

    // Commit phase: every check passed.
    let mut snapshots = Vec::with_capacity(plan.len());
    for (index, snapshot) in plan {
        if let Some(tier) = tiers.get_mut(index) {
            tier.remaining -= snapshot.quantity;
        }
        snapshots.push(snapshot);
    }

    Ok(Reservation {
        items: snapshots,
        quantity,
        total_cents,
    })
}

/// Returns the quantities of a cancelled ticket to their tiers.
///
/// Counters never exceed capacity. Tiers no longer on the event are
/// skipped. Returns the number of admissions actually restored.
pub fn release(tiers: &mut [TicketTier], items: &[TierSnapshot]) -> u32 {
    let mut restored: u32 = 0;
    for item in items {
        let Some(tier) = tiers.iter_mut().find(|t| t.id == item.tier_id) else {
            tracing::warn!(tier_id = %item.tier_id, "released tier no longer exists");
            continue;
        };
        let amount = item.quantity.min(tier.sold());
        tier.remaining += amount;
        restored = restored.saturating_add(amount);
    }
    restored
}

/// Sums quantities per tier, preserving first-appearance order.
fn merge_line_items(items: &[LineItem]) -> Result<Vec<(TierId, u32)>, TicketingError> {
    if items.is_empty() {
        return Err(TicketingError::InvalidRequest(
            "a purchase needs at least one line item".to_string(),
        ));
    }
    let mut merged: Vec<(TierId, u32)> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(TicketingError::InvalidRequest(format!(
                "quantity for tier {} must be positive",
                item.tier_id
            )));
        }
        match merged.iter_mut().find(|(id, _)| *id == item.tier_id) {
            Some((_, qty)) => *qty = qty.checked_add(item.quantity).ok_or_else(overflow)?,
            None => merged.push((item.tier_id, item.quantity)),
        }
    }
    Ok(merged)
}

fn overflow() -> TicketingError {
    TicketingError::InvalidRequest("order quantity or total is too large".to_string())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn tier(name: &str, price_cents: u64, capacity: u32) -> TicketTier {
        let Ok(tier) = TicketTier::new(name, price_cents, capacity, None) else {
            panic!("valid tier");
        };
        tier
    }

    fn line(tier: &TicketTier, quantity: u32) -> LineItem {
        LineItem {
            tier_id: tier.id,
            quantity,
        }
    }

    #[test]
    fn reserves_across_multiple_tiers() {
        let mut tiers = vec![tier("General", 2_000, 100), tier("VIP", 9_000, 10)];
        let items = [line(&tiers[0], 3), line(&tiers[1], 2)];

        let Ok(reservation) = reserve(EventId::new(), &mut tiers, &items, 10) else {
            panic!("reservation should succeed");
        };

        assert_eq!(reservation.quantity, 5);
        assert_eq!(reservation.total_cents, 3 * 2_000 + 2 * 9_000);
        assert_eq!(reservation.items.len(), 2);
        assert_eq!(reservation.items[1].tier_name, "VIP");
        assert_eq!(tiers[0].remaining, 97);
        assert_eq!(tiers[1].remaining, 8);
    }

    #[test]
    fn oversold_line_rejects_whole_purchase() {
        let mut tiers = vec![tier("General", 2_000, 100), tier("VIP", 9_000, 1)];
        let items = [line(&tiers[0], 4), line(&tiers[1], 2)];

        let result = reserve(EventId::new(), &mut tiers, &items, 10);

        let Err(TicketingError::InsufficientInventory {
            requested,
            remaining,
            ..
        }) = result
        else {
            panic!("expected insufficient inventory, got {result:?}");
        };
        assert_eq!((requested, remaining), (2, 1));
        assert_eq!(tiers[0].remaining, 100, "first tier must be untouched");
        assert_eq!(tiers[1].remaining, 1);
    }

    #[test]
    fn duplicate_lines_are_merged_before_checking() {
        let mut tiers = vec![tier("General", 1_000, 5)];
        let items = [line(&tiers[0], 3), line(&tiers[0], 3)];

        let result = reserve(EventId::new(), &mut tiers, &items, 10);
        assert!(matches!(
            result,
            Err(TicketingError::InsufficientInventory { requested: 6, .. })
        ));
        assert_eq!(tiers[0].remaining, 5);

        let items = [line(&tiers[0], 2), line(&tiers[0], 3)];
        let Ok(reservation) = reserve(EventId::new(), &mut tiers, &items, 10) else {
            panic!("merged quantity fits");
        };
        assert_eq!(reservation.items.len(), 1);
        assert_eq!(reservation.items[0].quantity, 5);
        assert_eq!(tiers[0].remaining, 0);
    }

    #[test]
    fn unknown_tier_is_rejected_without_side_effects() {
        let mut tiers = vec![tier("General", 1_000, 5)];
        let items = [
            line(&tiers[0], 1),
            LineItem {
                tier_id: TierId::new(),
                quantity: 1,
            },
        ];
        let result = reserve(EventId::new(), &mut tiers, &items, 10);
        assert!(matches!(result, Err(TicketingError::TierNotFound { .. })));
        assert_eq!(tiers[0].remaining, 5);
    }

    #[test]
    fn empty_and_zero_quantity_orders_are_invalid() {
        let mut tiers = vec![tier("General", 1_000, 5)];
        assert!(matches!(
            reserve(EventId::new(), &mut tiers, &[], 10),
            Err(TicketingError::InvalidRequest(_))
        ));
        let items = [line(&tiers[0], 0)];
        assert!(matches!(
            reserve(EventId::new(), &mut tiers, &items, 10),
            Err(TicketingError::InvalidRequest(_))
        ));
    }

    #[test]
    fn per_order_limit_uses_tier_override() {
        let mut tiers = vec![tier("General", 1_000, 50), tier("Backstage", 1_000, 50)];
        tiers[1].max_per_order = Some(2);

        let items = [line(&tiers[0], 5)];
        assert!(matches!(
            reserve(EventId::new(), &mut tiers, &items, 4),
            Err(TicketingError::OrderLimitExceeded { limit: 4, .. })
        ));

        let items = [line(&tiers[1], 3)];
        assert!(matches!(
            reserve(EventId::new(), &mut tiers, &items, 10),
            Err(TicketingError::OrderLimitExceeded { limit: 2, .. })
        ));
    }

    #[test]
    fn price_overflow_is_invalid() {
        let mut tiers = vec![tier("Gold", u64::MAX, 10)];
        let items = [line(&tiers[0], 2)];
        assert!(matches!(
            reserve(EventId::new(), &mut tiers, &items, 10),
            Err(TicketingError::InvalidRequest(_))
        ));
        assert_eq!(tiers[0].remaining, 10);
    }

    #[test]
    fn release_restores_and_caps_at_capacity() {
        let mut tiers = vec![tier("General", 1_000, 10)];
        let items = [line(&tiers[0], 4)];
        let Ok(reservation) = reserve(EventId::new(), &mut tiers, &items, 10) else {
            panic!("reservation should succeed");
        };
        assert_eq!(tiers[0].remaining, 6);

        assert_eq!(release(&mut tiers, &reservation.items), 4);
        assert_eq!(tiers[0].remaining, 10);

        // A second release cannot push the counter past capacity.
        assert_eq!(release(&mut tiers, &reservation.items), 0);
        assert_eq!(tiers[0].remaining, 10);
    }

    #[test]
    fn release_skips_removed_tiers() {
        let mut tiers = vec![tier("General", 1_000, 10)];
        let orphan = TierSnapshot {
            tier_id: TierId::new(),
            tier_name: "Gone".to_string(),
            unit_price_cents: 1_000,
            quantity: 2,
            subtotal_cents: 2_000,
        };
        assert_eq!(release(&mut tiers, &[orphan]), 0);
        assert_eq!(tiers[0].remaining, 10);
    }
}
