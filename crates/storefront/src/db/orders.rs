//! Order repository.

use moda_brasil_core::{OrderId, OrderStatus, UserId};
use serde_json::{Map, Value};

use super::{RepositoryError, decode, encode};
use crate::models::Order;
use crate::store::{Collection, Document, DocumentStore, Filter};

/// Repository for the `orders` collection.
pub struct OrderRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Insert an order under a generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn add(&self, order: &Order) -> Result<OrderId, RepositoryError> {
        let id = self.store.add(Collection::Orders, encode(order)?).await?;
        Ok(OrderId::new(id))
    }

    /// An order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        self.store
            .get(Collection::Orders, id.as_str())
            .await?
            .map(with_id)
            .transpose()
    }

    /// Orders placed by a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_customer(&self, uid: &UserId) -> Result<Vec<Order>, RepositoryError> {
        self.list_newest_first(&Filter::field_eq("customerId", uid.as_str()))
            .await
    }

    /// Orders credited to a storefront partner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_seller(&self, uid: &UserId) -> Result<Vec<Order>, RepositoryError> {
        self.list_newest_first(&Filter::field_eq("sellerId", uid.as_str()))
            .await
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.list_newest_first(&Filter::All).await
    }

    /// Set fulfillment status and, optionally, a tracking code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_fulfillment(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_code: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut fields = Map::new();
        fields.insert("status".to_owned(), Value::from(status.as_str()));
        if let Some(code) = tracking_code {
            fields.insert("trackingCode".to_owned(), Value::from(code));
        }

        self.store
            .patch(Collection::Orders, id.as_str(), Value::Object(fields))
            .await
            .map_err(RepositoryError::from_store)
    }

    async fn list_newest_first(&self, filter: &Filter) -> Result<Vec<Order>, RepositoryError> {
        let mut orders = self
            .store
            .list(Collection::Orders, filter)
            .await?
            .into_iter()
            .map(with_id)
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

fn with_id(doc: Document) -> Result<Order, RepositoryError> {
    let id = OrderId::new(doc.id.clone());
    let mut order: Order = decode(doc)?;
    order.id = Some(id);
    Ok(order)
}
