use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::position::{AssetCategory, Position, Sale};

/// The fields the "update purchase" operation may change.
///
/// Category and owner are deliberately absent: both are immutable after
/// creation, so the update path cannot alter them even accidentally.
#[derive(Debug, Clone)]
pub struct PurchaseChange {
    pub asset_name: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub purchase_date: NaiveDate,
}

/// Manages the position lifecycle: create, update, delete positions and
/// their nested sale events.
///
/// Pure in-memory mutations over a `Ledger` — no I/O, no API calls.
/// Sales are addressed only through their parent position and are deleted
/// with it.
pub struct PositionService;

impl PositionService {
    pub fn new() -> Self {
        Self
    }

    /// Add a new position to the ledger. Validates the purchase fields and
    /// that the position belongs to the ledger's owner.
    pub fn add_position(&self, ledger: &mut Ledger, position: Position) -> Result<(), CoreError> {
        if position.owner != ledger.owner {
            return Err(CoreError::Validation(format!(
                "Position owner {} does not match ledger owner {}",
                position.owner, ledger.owner
            )));
        }
        Self::validate_purchase(&position.asset_name, position.quantity, position.buy_price)?;
        for sale in &position.sales {
            Self::validate_sale(sale.units_sold, sale.sell_price)?;
        }
        ledger.positions.push(position);
        Ok(())
    }

    /// Update the purchase details of an existing position.
    ///
    /// The quantity is never adjusted automatically when sales occur; this
    /// is the only path that changes it. Validates before committing.
    pub fn update_purchase(
        &self,
        ledger: &mut Ledger,
        position_id: Uuid,
        change: PurchaseChange,
    ) -> Result<(), CoreError> {
        Self::validate_purchase(&change.asset_name, change.quantity, change.buy_price)?;

        let position = ledger
            .position_mut(position_id)
            .ok_or_else(|| CoreError::PositionNotFound(position_id.to_string()))?;

        position.asset_name = change.asset_name.trim().to_string();
        position.quantity = change.quantity;
        position.buy_price = change.buy_price;
        position.purchase_date = change.purchase_date;
        Ok(())
    }

    /// Remove a position entirely. Its sales go with it — they are an owned
    /// child collection, never referenced independently.
    pub fn remove_position(
        &self,
        ledger: &mut Ledger,
        position_id: Uuid,
    ) -> Result<Position, CoreError> {
        let idx = ledger
            .positions
            .iter()
            .position(|p| p.id == position_id)
            .ok_or_else(|| CoreError::PositionNotFound(position_id.to_string()))?;
        Ok(ledger.positions.remove(idx))
    }

    /// Record a sale against a position. Returns the new sale's id.
    ///
    /// Over-selling is NOT rejected here: the aggregate of units sold may
    /// exceed the purchased quantity, and downstream consumers see the
    /// resulting negative remaining quantity. Bounds enforcement is a
    /// boundary-layer concern.
    pub fn add_sale(
        &self,
        ledger: &mut Ledger,
        position_id: Uuid,
        units_sold: f64,
        sell_price: f64,
        date: NaiveDate,
    ) -> Result<Uuid, CoreError> {
        Self::validate_sale(units_sold, sell_price)?;

        let position = ledger
            .position_mut(position_id)
            .ok_or_else(|| CoreError::PositionNotFound(position_id.to_string()))?;

        let sale = Sale::new(units_sold, sell_price, date);
        let id = sale.id;
        position.sales.push(sale);
        Ok(id)
    }

    /// Edit one sale of a position in place.
    pub fn update_sale(
        &self,
        ledger: &mut Ledger,
        position_id: Uuid,
        sale_id: Uuid,
        units_sold: f64,
        sell_price: f64,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        Self::validate_sale(units_sold, sell_price)?;

        let position = ledger
            .position_mut(position_id)
            .ok_or_else(|| CoreError::PositionNotFound(position_id.to_string()))?;

        let sale = position
            .sales
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        sale.units_sold = units_sold;
        sale.sell_price = sell_price;
        sale.date = date;
        Ok(())
    }

    /// Remove one sale from a position. The position itself stays.
    pub fn remove_sale(
        &self,
        ledger: &mut Ledger,
        position_id: Uuid,
        sale_id: Uuid,
    ) -> Result<Sale, CoreError> {
        let position = ledger
            .position_mut(position_id)
            .ok_or_else(|| CoreError::PositionNotFound(position_id.to_string()))?;

        let idx = position
            .sales
            .iter()
            .position(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        Ok(position.sales.remove(idx))
    }

    /// All positions, newest purchase first (the listing order of the UI).
    pub fn positions_by_date_desc<'a>(&self, ledger: &'a Ledger) -> Vec<&'a Position> {
        let mut positions: Vec<&Position> = ledger.positions.iter().collect();
        positions.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        positions
    }

    /// Positions in one category, in insertion order.
    pub fn positions_in_category<'a>(
        &self,
        ledger: &'a Ledger,
        category: AssetCategory,
    ) -> Vec<&'a Position> {
        ledger
            .positions
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    fn validate_purchase(asset_name: &str, quantity: f64, buy_price: f64) -> Result<(), CoreError> {
        if asset_name.trim().is_empty() {
            return Err(CoreError::Validation("Asset name must not be empty".into()));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Quantity must be a positive number, got {quantity}"
            )));
        }
        if !buy_price.is_finite() || buy_price < 0.0 {
            return Err(CoreError::Validation(format!(
                "Buy price must be non-negative, got {buy_price}"
            )));
        }
        Ok(())
    }

    fn validate_sale(units_sold: f64, sell_price: f64) -> Result<(), CoreError> {
        if !units_sold.is_finite() || units_sold <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Units sold must be a positive number, got {units_sold}"
            )));
        }
        if !sell_price.is_finite() || sell_price < 0.0 {
            return Err(CoreError::Validation(format!(
                "Sell price must be non-negative, got {sell_price}"
            )));
        }
        Ok(())
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}
