//! Fee payment handlers: checkout initiation, callback verification, and
//! history.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::AuthenticatedUser;
use super::error::ApiResult;
use super::state::HttpState;
use crate::domain::fees::PaymentConfirmation;
use crate::domain::{Error, FeePeriod, Payment, PaymentWithPayer, Role};

/// Period the member wants to pay for.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Month ordinal in `1..=12`.
    pub month: u8,
    /// Calendar year.
    pub year: i32,
}

/// Gateway order details the client needs to open the checkout UI.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    /// Gateway order identifier.
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Gateway public key identifier.
    pub key_id: String,
}

/// The gateway callback forwarded by the client after checkout.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Gateway payment identifier.
    pub payment_id: String,
    /// Hex HMAC-SHA256 signature over `order_id|payment_id`.
    pub signature: String,
    /// Month ordinal the payment covers.
    pub month: u8,
    /// Calendar year the payment covers.
    pub year: i32,
}

/// Acknowledgment of a reconciled payment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Identifier of the durable payment row.
    pub payment_id: Uuid,
}

/// A payment joined with payer details, shown on the admin ledger.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminPaymentRow {
    #[serde(flatten)]
    #[schema(inline)]
    payment: Payment,
    /// Payer's login name.
    username: String,
    /// Payer's display name.
    full_name: String,
    /// Payer's room assignment.
    room_number: String,
}

impl From<PaymentWithPayer> for AdminPaymentRow {
    fn from(row: PaymentWithPayer) -> Self {
        Self {
            payment: row.payment,
            username: row.username,
            full_name: row.full_name,
            room_number: row.room_number,
        }
    }
}

fn parse_period(month: u8, year: i32) -> Result<FeePeriod, Error> {
    FeePeriod::try_new(month, year).map_err(|e| Error::invalid_request(e.to_string()))
}

/// Start a fee payment for one period.
#[utoipa::path(
    post,
    path = "/api/payments/create",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Gateway order created", body = CreatePaymentResponse),
        (status = 400, description = "Invalid period or period already paid"),
    ),
)]
pub async fn create_payment(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    body: web::Json<CreatePaymentRequest>,
) -> ApiResult<HttpResponse> {
    let period = parse_period(body.month, body.year)?;
    let initiation = state.fees.begin_payment(user.id, period).await?;
    Ok(HttpResponse::Ok().json(CreatePaymentResponse {
        order_id: initiation.order_id,
        amount: initiation.amount_minor,
        currency: initiation.currency,
        key_id: initiation.key_id,
    }))
}

/// Verify the gateway's signed callback and finalise the payment.
#[utoipa::path(
    post,
    path = "/api/payments/verify",
    tag = "payments",
    request_body = VerifyPaymentRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Payment recorded", body = VerifyPaymentResponse),
        (status = 400, description = "Invalid signature or period"),
    ),
)]
pub async fn verify_payment(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    body: web::Json<VerifyPaymentRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let period = parse_period(body.month, body.year)?;
    let confirmed = state
        .fees
        .confirm_payment(
            user.id,
            PaymentConfirmation {
                order_id: body.order_id,
                payment_ref: body.payment_id,
                signature: body.signature,
                period,
            },
            Utc::now(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
        message: "payment verified".into(),
        payment_id: confirmed.payment_id,
    }))
}

/// Payment history: members see their own, admins see everyone's with payer
/// details.
#[utoipa::path(
    get,
    path = "/api/payments/history",
    tag = "payments",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Payment history, newest first"),
    ),
)]
pub async fn history(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    match user.role {
        Role::Admin => {
            let rows: Vec<AdminPaymentRow> = state
                .fees
                .full_history()
                .await?
                .into_iter()
                .map(AdminPaymentRow::from)
                .collect();
            Ok(HttpResponse::Ok().json(rows))
        }
        Role::Member => {
            let payments = state.fees.history_for_user(user.id).await?;
            Ok(HttpResponse::Ok().json(payments))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::FeePeriodFields;
    use crate::domain::ports::GatewayOrder;
    use crate::inbound::http::testing::{TestDeps, auth_config, bearer};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    fn paid_payment(user_id: Uuid) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            user_id,
            period: FeePeriodFields {
                month: 3,
                year: 2024,
            },
            amount: 500,
            status: "paid".into(),
            payment_ref: "pay_7".into(),
            paid_at: Utc::now(),
        }
    }

    async fn app(
        deps: TestDeps,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(
            App::new()
                .app_data(deps.into_state())
                .app_data(web::Data::new(auth_config()))
                .route("/api/payments/create", web::post().to(create_payment))
                .route("/api/payments/verify", web::post().to(verify_payment))
                .route("/api/payments/history", web::get().to(history)),
        )
        .await
    }

    #[actix_web::test]
    async fn create_payment_returns_the_gateway_order() {
        let user_id = Uuid::new_v4();
        let mut deps = TestDeps::default();
        deps.payments.expect_find_paid().returning(|_, _| Ok(None));
        deps.gateway.expect_create_order().returning(|amount, _| {
            Ok(GatewayOrder {
                order_id: "order_abc".into(),
                amount_minor: amount,
                currency: "INR".into(),
            })
        });
        deps.gateway
            .expect_key_id()
            .return_const("rzp_test_key".to_owned());
        deps.intents.expect_insert().returning(|intent| {
            Ok(crate::domain::payment::PaymentIntent {
                id: Uuid::new_v4(),
                user_id: intent.user_id,
                period: intent.period,
                amount: intent.amount,
                order_id: intent.order_id,
                payment_ref: None,
                status: crate::domain::payment::IntentStatus::Created,
                created_at: Utc::now(),
            })
        });

        let app = app(deps).await;
        let request = test::TestRequest::post()
            .uri("/api/payments/create")
            .insert_header(bearer(user_id, "asha", Role::Member))
            .set_json(json!({ "month": 3, "year": 2024 }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["orderId"], "order_abc");
        assert_eq!(body["amount"], 50_000);
        assert_eq!(body["keyId"], "rzp_test_key");
    }

    #[actix_web::test]
    async fn create_payment_rejects_an_out_of_range_month() {
        let app = app(TestDeps::default()).await;
        let request = test::TestRequest::post()
            .uri("/api/payments/create")
            .insert_header(bearer(Uuid::new_v4(), "asha", Role::Member))
            .set_json(json!({ "month": 13, "year": 2024 }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn create_payment_for_a_paid_period_reports_conflict() {
        let user_id = Uuid::new_v4();
        let mut deps = TestDeps::default();
        deps.payments
            .expect_find_paid()
            .returning(move |_, _| Ok(Some(paid_payment(user_id))));
        deps.gateway.expect_create_order().times(0);

        let app = app(deps).await;
        let request = test::TestRequest::post()
            .uri("/api/payments/create")
            .insert_header(bearer(user_id, "asha", Role::Member))
            .set_json(json!({ "month": 3, "year": 2024 }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "conflict");
        assert_eq!(body["message"], "this month already paid");
    }

    #[actix_web::test]
    async fn verify_payment_with_a_bad_signature_is_rejected() {
        let mut deps = TestDeps::default();
        deps.gateway
            .expect_verify_signature()
            .returning(|_, _, _| false);
        deps.payments.expect_insert().times(0);

        let app = app(deps).await;
        let request = test::TestRequest::post()
            .uri("/api/payments/verify")
            .insert_header(bearer(Uuid::new_v4(), "asha", Role::Member))
            .set_json(json!({
                "orderId": "order_abc",
                "paymentId": "pay_7",
                "signature": "deadbeef",
                "month": 3,
                "year": 2024
            }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["message"], "invalid payment signature");
    }

    #[actix_web::test]
    async fn verify_payment_records_and_acknowledges() {
        let user_id = Uuid::new_v4();
        let recorded = paid_payment(user_id);
        let payment_id = recorded.id;

        let mut deps = TestDeps::default();
        deps.gateway
            .expect_verify_signature()
            .returning(|_, _, _| true);
        deps.intents.expect_mark_paid().returning(|_, _| Ok(()));
        deps.payments
            .expect_insert()
            .return_once(move |_| Ok(recorded));
        // Post-confirmation side effects: email lookup plus report refresh.
        deps.users.expect_find_by_id().returning(|_| Ok(None));
        deps.users.expect_list().returning(|| Ok(Vec::new()));
        deps.payments.expect_list_all().returning(|| Ok(Vec::new()));
        deps.writer.expect_write().returning(|_| Ok(()));

        let app = app(deps).await;
        let request = test::TestRequest::post()
            .uri("/api/payments/verify")
            .insert_header(bearer(user_id, "asha", Role::Member))
            .set_json(json!({
                "orderId": "order_abc",
                "paymentId": "pay_7",
                "signature": "aa11",
                "month": 3,
                "year": 2024
            }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["paymentId"], payment_id.to_string());
    }

    #[actix_web::test]
    async fn members_see_their_own_history() {
        let user_id = Uuid::new_v4();
        let mut deps = TestDeps::default();
        deps.payments
            .expect_history_for_user()
            .returning(move |id| Ok(vec![paid_payment(id)]));

        let app = app(deps).await;
        let request = test::TestRequest::get()
            .uri("/api/payments/history")
            .insert_header(bearer(user_id, "asha", Role::Member))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body.as_array().expect("array").len(), 1);
        assert_eq!(body[0]["month"], 3);
        assert!(body[0].get("username").is_none());
    }

    #[actix_web::test]
    async fn admins_see_the_full_ledger_with_payer_details() {
        let mut deps = TestDeps::default();
        deps.payments.expect_history_all().returning(|| {
            Ok(vec![PaymentWithPayer {
                payment: paid_payment(Uuid::new_v4()),
                username: "asha".into(),
                full_name: "Asha Rao".into(),
                room_number: "B-204".into(),
            }])
        });

        let app = app(deps).await;
        let request = test::TestRequest::get()
            .uri("/api/payments/history")
            .insert_header(bearer(Uuid::new_v4(), "admin", Role::Admin))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body[0]["username"], "asha");
        assert_eq!(body[0]["roomNumber"], "B-204");
        assert_eq!(body[0]["month"], 3);
    }

    #[actix_web::test]
    async fn history_without_a_token_is_401() {
        let app = app(TestDeps::default()).await;
        let request = test::TestRequest::get()
            .uri("/api/payments/history")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
