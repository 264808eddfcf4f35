//! Invocation dispatcher
//!
//! Single entry point for the `/invoke/:operation` envelope. Resolves the
//! operation name, consults the idempotency ledger, enforces the owner
//! gate, validates the input shape, and routes to the equipment and
//! checkout services. Terminal outcomes (success or domain failure) are
//! recorded under the idempotency key so retries replay the original
//! response instead of re-executing.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::{
    config::OwnerConfig,
    error::{AppError, AppResult},
    models::envelope::{
        self, AddEquipmentInput, CheckoutEquipmentInput, GetEquipmentDetailsInput,
        GetUserCheckoutsInput, InvokeRequest, Operation, RemoveEquipmentInput,
        ReturnEquipmentInput, UpdateEquipmentStatusInput,
    },
    store::idempotency::{fingerprint, IdempotencyLedger, Outcome, Resolution},
};

use super::{checkouts::CheckoutsService, equipment::EquipmentService};

#[derive(Clone)]
pub struct Dispatcher {
    equipment: EquipmentService,
    checkouts: CheckoutsService,
    ledger: IdempotencyLedger,
    owner: OwnerConfig,
}

impl Dispatcher {
    pub fn new(
        equipment: EquipmentService,
        checkouts: CheckoutsService,
        ledger: IdempotencyLedger,
        owner: OwnerConfig,
    ) -> Self {
        Self {
            equipment,
            checkouts,
            ledger,
            owner,
        }
    }

    /// Whether a caller identity is the configured owner. The empty string
    /// marks an anonymous caller and never matches.
    fn is_owner(&self, caller: &str) -> bool {
        !caller.is_empty() && caller == self.owner.identity
    }

    /// Run one invocation through the full pipeline
    pub async fn invoke(&self, operation_name: &str, body: Value) -> AppResult<Outcome> {
        // Unknown operations and unusable envelopes fail before the ledger
        // is consulted; there is no key to record them under.
        let operation = Operation::parse(operation_name)?;
        let request = InvokeRequest::from_body(body)?;

        let print = fingerprint(operation.name(), &request.input);
        if let Resolution::Replay(outcome) = self
            .ledger
            .resolve(&request.idempotency_key, operation.name(), &print)
            .await?
        {
            tracing::debug!(
                key = %request.idempotency_key,
                operation = operation.name(),
                "replaying recorded outcome"
            );
            return Ok(outcome);
        }

        let outcome = match self.execute(operation, &request).await {
            Ok(outcome) => outcome,
            Err(err) if err.is_recordable() => Outcome {
                status: err.status_code().as_u16(),
                body: err.to_body(),
            },
            Err(err) => {
                // Infrastructure-class failure: leave no entry so the same
                // key can retry once conditions recover
                self.ledger.abandon(&request.idempotency_key).await;
                return Err(err);
            }
        };

        self.ledger
            .record(&request.idempotency_key, outcome.clone())
            .await;
        Ok(outcome)
    }

    /// Authorization, input validation, and the operation itself
    async fn execute(&self, operation: Operation, request: &InvokeRequest) -> AppResult<Outcome> {
        if operation.owner_only() && !self.is_owner(&request.key) {
            return Err(AppError::Unauthorized(format!(
                "operation {} requires the owner key",
                operation.name()
            )));
        }

        let (status, body) = match operation {
            Operation::AddEquipment => {
                let input: AddEquipmentInput = envelope::parse_input(&request.input)?;
                let equipment = self.equipment.add(input).await?;
                (
                    StatusCode::CREATED,
                    json!({ "message": "Equipment added", "equipment": equipment }),
                )
            }
            Operation::CheckoutEquipment => {
                let input: CheckoutEquipmentInput = envelope::parse_input(&request.input)?;
                let equipment = self
                    .equipment
                    .checkout(&input.id, &input.borrower_name)
                    .await?;
                (
                    StatusCode::OK,
                    json!({ "message": "Equipment checked out", "equipment": equipment }),
                )
            }
            Operation::ReturnEquipment => {
                let input: ReturnEquipmentInput = envelope::parse_input(&request.input)?;
                let equipment = self.equipment.return_equipment(&input.id).await?;
                (
                    StatusCode::OK,
                    json!({ "message": "Equipment returned", "equipment": equipment }),
                )
            }
            Operation::RemoveEquipment => {
                let input: RemoveEquipmentInput = envelope::parse_input(&request.input)?;
                let equipment = self
                    .equipment
                    .remove(&input.id, &input.removal_reason)
                    .await?;
                (
                    StatusCode::OK,
                    json!({ "message": "Equipment removed", "equipment": equipment }),
                )
            }
            Operation::UpdateEquipmentStatus => {
                let input: UpdateEquipmentStatusInput = envelope::parse_input(&request.input)?;
                let equipment = self
                    .equipment
                    .update_status(&input.id, &input.new_status, &input.status_reason)
                    .await?;
                (
                    StatusCode::OK,
                    json!({ "message": "Equipment status updated", "equipment": equipment }),
                )
            }
            Operation::GetEquipmentDetails => {
                let input: GetEquipmentDetailsInput = envelope::parse_input(&request.input)?;
                let equipment = self.equipment.get_by_id(&input.id).await?;
                let body = serde_json::to_value(equipment)
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                (StatusCode::OK, body)
            }
            Operation::GetAllEquipment => {
                let equipment = self.equipment.list().await;
                (StatusCode::OK, json!({ "data": equipment }))
            }
            Operation::GetUserCheckouts => {
                let input: GetUserCheckoutsInput = envelope::parse_input(&request.input)?;
                let records = self.checkouts.get_user_checkouts(&input.user).await?;
                (StatusCode::OK, json!({ "data": records }))
            }
            Operation::Owner => (StatusCode::OK, json!({ "owner": self.owner.identity })),
        };

        Ok(Outcome {
            status: status.as_u16(),
            body,
        })
    }
}
