//! Per-entity gateway services over the fixed backend paths.
//!
//! Each service is a thin struct over a cloned [`ApiClient`], mapping CRUD
//! verbs onto one REST prefix. Success returns the decoded response (typed
//! JSON, or the backend's plain-text acknowledgment strings); failure is the
//! normalized [`ApiError`](crate::error::ApiError). Nothing here retries:
//! every failure is terminal for that attempt and the caller re-triggers.

use crate::client::ApiClient;
use crate::error::{ApiError, ErrorMessage};
use crate::model::{
    AdminNotification, AuthRequest, NotificationRequest, PerformanceMetric, RegisterRequest,
    Stock, TransactionLog, Vendor, Zone,
};

/// Login and registration. The only two calls that never carry a bearer
/// header.
#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Authenticate and return the raw token text the backend issues.
    ///
    /// The caller is responsible for writing the token into the store and
    /// refreshing the session manager afterwards.
    pub async fn login(&self, credentials: &AuthRequest) -> Result<String, ApiError> {
        self.api.post_json_text("/auth/authenticate", credentials).await
    }

    /// Register a new account; returns the backend's acknowledgment text.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<String, ApiError> {
        self.api.post_json_text("/auth/new", registration).await
    }
}

/// CRUD over `/zones`.
#[derive(Clone, Debug)]
pub struct ZoneService {
    api: ApiClient,
}

impl ZoneService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Zone>, ApiError> {
        self.api.get_json("/zones/fetchAll").await
    }

    pub async fn create(&self, zone: &Zone) -> Result<String, ApiError> {
        self.api.post_json_text("/zones/save", zone).await
    }

    pub async fn update(&self, zone: &Zone) -> Result<Zone, ApiError> {
        self.api.put_json_json("/zones/update", zone).await
    }

    pub async fn delete(&self, zone_id: i64) -> Result<String, ApiError> {
        self.api.delete_text(&format!("/zones/deleteById/{zone_id}")).await
    }
}

/// CRUD over `/vendors`. Same shape as zones.
#[derive(Clone, Debug)]
pub struct VendorService {
    api: ApiClient,
}

impl VendorService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Vendor>, ApiError> {
        self.api.get_json("/vendors/fetchAll").await
    }

    pub async fn create(&self, vendor: &Vendor) -> Result<String, ApiError> {
        self.api.post_json_text("/vendors/save", vendor).await
    }

    pub async fn update(&self, vendor: &Vendor) -> Result<Vendor, ApiError> {
        self.api.put_json_json("/vendors/update", vendor).await
    }

    pub async fn delete(&self, vendor_id: i64) -> Result<String, ApiError> {
        self.api.delete_text(&format!("/vendors/deleteById/{vendor_id}")).await
    }
}

/// CRUD over `/stock`. Updates go through the inbound-specific endpoint the
/// backend exposes.
#[derive(Clone, Debug)]
pub struct StockService {
    api: ApiClient,
}

impl StockService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_all(&self) -> Result<Vec<Stock>, ApiError> {
        self.api.get_json("/stock/fetchAll").await
    }

    pub async fn create(&self, stock: &Stock) -> Result<String, ApiError> {
        self.api.post_json_text("/stock/save", stock).await
    }

    pub async fn update_inbound(&self, stock: &Stock) -> Result<Stock, ApiError> {
        self.api.put_json_json("/stock/updateInbound", stock).await
    }

    pub async fn delete(&self, stock_id: i64) -> Result<String, ApiError> {
        self.api.delete_text(&format!("/stock/deleteById/{stock_id}")).await
    }
}

/// Fetch, record and delete over `/transactionlog`.
#[derive(Clone, Debug)]
pub struct TransactionService {
    api: ApiClient,
}

impl TransactionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_all(&self) -> Result<Vec<TransactionLog>, ApiError> {
        self.api.get_json("/transactionlog/fetchAll").await
    }

    /// Record a movement; returns the backend's acknowledgment text.
    ///
    /// The backend reports a missing stock item with a couple of different
    /// phrasings; both are rewritten into the one message the views show.
    pub async fn create(&self, transaction: &TransactionLog) -> Result<String, ApiError> {
        self.api
            .post_json_text("/transactionlog/save", transaction)
            .await
            .map_err(Self::rewrite_missing_stock)
    }

    pub async fn delete(&self, transaction_id: i64) -> Result<String, ApiError> {
        self.api
            .delete_text(&format!("/transactionlog/delete/{transaction_id}"))
            .await
    }

    fn rewrite_missing_stock(err: ApiError) -> ApiError {
        match err {
            ApiError::Status { status, message }
                if message.text.contains("StockItem Not Found")
                    || message.text.contains("Stock Not Found") =>
            {
                ApiError::Status {
                    status,
                    message: ErrorMessage {
                        kind: message.kind,
                        text: "Stock not found! Transaction failed.".to_string(),
                    },
                }
            }
            other => other,
        }
    }
}

/// Admin notifications over `/notifications`.
#[derive(Clone, Debug)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_all(&self) -> Result<Vec<AdminNotification>, ApiError> {
        self.api.get_json("/notifications/fetchAll").await
    }

    /// Send a custom notification; the backend echoes the stored record.
    pub async fn send(
        &self,
        notification: &NotificationRequest,
    ) -> Result<serde_json::Value, ApiError> {
        self.api.post_json_json("/notifications/send", notification).await
    }

    /// Trigger the backend's low-stock alert for one stock item.
    pub async fn notify_low_stock(&self, stock_id: i64) -> Result<String, ApiError> {
        self.api
            .post_empty_text(&format!("/notifications/low-stock/{stock_id}"))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<String, ApiError> {
        self.api.delete_text(&format!("/notifications/delete/{id}")).await
    }
}

/// Performance metrics over `/metrics`.
#[derive(Clone, Debug)]
pub struct MetricsService {
    api: ApiClient,
}

impl MetricsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Metrics of one type (e.g. "Turnover", "Space Utilization").
    pub async fn by_type(&self, metric_type: &str) -> Result<Vec<PerformanceMetric>, ApiError> {
        self.api.get_json(&format!("/metrics/bytype/{metric_type}")).await
    }

    /// Ask the backend to recompute its metrics; returns acknowledgment text.
    pub async fn calculate(&self) -> Result<String, ApiError> {
        self.api.get_text("/metrics/calmetrics").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testserver::{request_body, respond_once};
    use crate::error::MessageKind;
    use crate::token::TokenStore;

    fn api(base_url: &str) -> ApiClient {
        let tokens = TokenStore::new();
        tokens.set("test-token");
        ApiClient::new(base_url, tokens)
    }

    fn sample_zone() -> Zone {
        Zone {
            zone_id: 0,
            zone_name: "Dock A".to_string(),
            total_capacity: 400,
            stored_capacity: 0,
        }
    }

    #[tokio::test]
    async fn zone_create_posts_camel_case_body_to_save_path() {
        let (base_url, server) = respond_once("200 OK", "Zone Saved Successfully").await;
        let service = ZoneService::new(api(&base_url));

        let ack = service.create(&sample_zone()).await.unwrap();
        assert_eq!(ack, "Zone Saved Successfully");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /zones/save HTTP/1.1"));
        let body: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
        assert_eq!(body["zoneName"], "Dock A");
        assert_eq!(body["totalCapacity"], 400);
    }

    #[tokio::test]
    async fn created_record_round_trips_through_fetch_all() {
        // Create against one server, capturing the exact JSON we sent...
        let (base_url, server) = respond_once("200 OK", "Saved").await;
        let service = ZoneService::new(api(&base_url));
        let submitted = sample_zone();
        service.create(&submitted).await.unwrap();
        let sent_body = request_body(&server.await.unwrap()).to_string();

        // ...then serve that same record back from fetchAll. Every submitted
        // field must come back unchanged.
        let (base_url, _server) = respond_once("200 OK", format!("[{sent_body}]")).await;
        let service = ZoneService::new(api(&base_url));
        let fetched = service.fetch_all().await.unwrap();
        assert_eq!(fetched, vec![submitted]);
    }

    #[tokio::test]
    async fn delete_targets_the_id_path() {
        let (base_url, server) = respond_once("200 OK", "Deleted").await;
        let service = VendorService::new(api(&base_url));

        service.delete(42).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /vendors/deleteById/42 HTTP/1.1"));
    }

    #[tokio::test]
    async fn stock_update_uses_the_inbound_endpoint() {
        let stock = Stock {
            stock_id: 9,
            stock_name: "Bolts".to_string(),
            stock_category: "Hardware".to_string(),
            stock_quantity: 55,
            zone_id: 1,
            vendor_id: 2,
        };
        let body = serde_json::to_string(&stock).unwrap();
        let (base_url, server) = respond_once("200 OK", body).await;
        let service = StockService::new(api(&base_url));

        let updated = service.update_inbound(&stock).await.unwrap();
        assert_eq!(updated, stock);

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /stock/updateInbound HTTP/1.1"));
    }

    #[tokio::test]
    async fn transaction_create_rewrites_missing_stock_message() {
        let (base_url, _server) = respond_once(
            "404 Not Found",
            r#"{"message": "StockItem Not Found with id 9"}"#,
        )
        .await;
        let service = TransactionService::new(api(&base_url));

        let tx = TransactionLog {
            transaction_id: 0,
            stock_id: 9,
            user_id: 1,
            zone_id: 1,
            quantity: 5,
            transaction_type: "inbound".to_string(),
            timestamp: chrono::Utc::now(),
            price: 2.0,
        };
        let err = service.create(&tx).await.unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                // Provenance survives the rewrite; only the text changes.
                assert_eq!(message.kind, MessageKind::Parsed);
                assert_eq!(message.text, "Stock not found! Transaction failed.");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unrelated_transaction_errors_pass_through() {
        let (base_url, _server) =
            respond_once("400 Bad Request", "quantity must be positive").await;
        let service = TransactionService::new(api(&base_url));

        let tx = TransactionLog {
            transaction_id: 0,
            stock_id: 9,
            user_id: 1,
            zone_id: 1,
            quantity: 0,
            transaction_type: "inbound".to_string(),
            timestamp: chrono::Utc::now(),
            price: 2.0,
        };
        let err = service.create(&tx).await.unwrap_err();
        assert_eq!(err.display_message(), "quantity must be positive");
    }

    #[tokio::test]
    async fn low_stock_trigger_posts_empty_body() {
        let (base_url, server) = respond_once("200 OK", "Low stock alert sent").await;
        let service = NotificationService::new(api(&base_url));

        let ack = service.notify_low_stock(7).await.unwrap();
        assert_eq!(ack, "Low stock alert sent");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /notifications/low-stock/7 HTTP/1.1"));
        assert_eq!(request_body(&request), "");
    }

    #[tokio::test]
    async fn metrics_by_type_interpolates_the_type_segment() {
        let (base_url, server) = respond_once("200 OK", "[]").await;
        let service = MetricsService::new(api(&base_url));

        let metrics = service.by_type("Turnover").await.unwrap();
        assert!(metrics.is_empty());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /metrics/bytype/Turnover HTTP/1.1"));
    }
}
