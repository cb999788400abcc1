//! Annotation definitions and the store they live in.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, EnumString};
use tracing::debug;

use super::fetch::{Endpoint, PaginatedFetcher};
use super::identity::DeviceIdentity;
use super::reconcile::StatusRecord;
use crate::config::EndpointsConfig;
use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiTransport};

/// The five fixed annotation names written for every full device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize)]
pub enum AnnotationName {
    #[strum(serialize = "Plan_Status")]
    PlanStatus,
    #[strum(serialize = "Plan_Action")]
    PlanAction,
    #[strum(serialize = "Plan_Version_Type")]
    PlanVersionType,
    #[strum(serialize = "Plan_Error_Reasons")]
    PlanErrorReasons,
    #[strum(serialize = "Plan_Force_Install_Date")]
    PlanForceInstallDate,
}

impl AnnotationName {
    pub const ALL: [Self; 5] = [
        Self::PlanStatus,
        Self::PlanAction,
        Self::PlanVersionType,
        Self::PlanErrorReasons,
        Self::PlanForceInstallDate,
    ];

    /// Text used when the definition has to be created.
    pub fn description(self) -> &'static str {
        match self {
            Self::PlanStatus => "Current state of the device's software update plan",
            Self::PlanAction => "Update action requested by the plan",
            Self::PlanVersionType => "Version type targeted by the plan",
            Self::PlanErrorReasons => "Error reasons reported for the plan",
            Self::PlanForceInstallDate => "Date the update is forcibly installed",
        }
    }

    /// The value this annotation takes for a status record.
    pub fn value_of(self, status: &StatusRecord) -> &str {
        match self {
            Self::PlanStatus => &status.plan_status,
            Self::PlanAction => &status.plan_action,
            Self::PlanVersionType => &status.version_type,
            Self::PlanErrorReasons => &status.error_reasons,
            Self::PlanForceInstallDate => &status.force_install_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationDefinition {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl AnnotationDefinition {
    fn from_json(payload: &Value) -> Option<Self> {
        let id = payload.get("id").and_then(DeviceIdentity::from_json)?;
        let name = payload.get("name")?.as_str()?.trim().to_string();
        Some(Self {
            id: id.as_str().to_string(),
            name,
            description: payload
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }
}

/// One value keyed by the definition it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationValue {
    pub definition_id: String,
    pub value: String,
}

/// External store holding per-device annotations.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    async fn list_definitions(&self) -> Result<Vec<AnnotationDefinition>, ApiError>;

    async fn create_definition(
        &self,
        name: &str,
        description: &str,
    ) -> Result<AnnotationDefinition, ApiError>;

    /// Write all values for one device in a single request.
    async fn write_values(
        &self,
        device: &DeviceIdentity,
        values: &[AnnotationValue],
    ) -> Result<(), ApiError>;
}

/// [`AnnotationStore`] backed by the device-management API's extension
/// attributes.
pub struct HttpAnnotationStore<'a, T: ApiTransport + ?Sized> {
    transport: &'a T,
    endpoints: &'a EndpointsConfig,
    page_size: usize,
}

impl<'a, T: ApiTransport + ?Sized> HttpAnnotationStore<'a, T> {
    pub fn new(transport: &'a T, endpoints: &'a EndpointsConfig, page_size: usize) -> Self {
        Self {
            transport,
            endpoints,
            page_size,
        }
    }
}

#[async_trait]
impl<'a, T: ApiTransport + ?Sized> AnnotationStore for HttpAnnotationStore<'a, T> {
    async fn list_definitions(&self) -> Result<Vec<AnnotationDefinition>, ApiError> {
        let endpoint = Endpoint::new("annotation definitions", &self.endpoints.definitions);
        let items = PaginatedFetcher::new(self.transport, self.page_size)
            .fetch_all(&endpoint)
            .await?;
        let definitions: Vec<AnnotationDefinition> = items
            .iter()
            .filter_map(AnnotationDefinition::from_json)
            .collect();
        debug!(
            received = items.len(),
            usable = definitions.len(),
            "listed annotation definitions"
        );
        Ok(definitions)
    }

    async fn create_definition(
        &self,
        name: &str,
        description: &str,
    ) -> Result<AnnotationDefinition, ApiError> {
        let body = json!({
            "name": name,
            "description": description,
            "dataType": "STRING",
            "enabled": true,
            "inventoryDisplayType": "EXTENSION_ATTRIBUTES",
            "inputType": "TEXT",
        });
        let response = self
            .transport
            .execute(ApiRequest::post(
                "create annotation definition",
                &self.endpoints.definitions,
                body,
            ))
            .await?;

        let id = response
            .get("id")
            .and_then(DeviceIdentity::from_json)
            .ok_or_else(|| {
                ApiError::decode("create annotation definition", "response carries no `id`")
            })?;
        Ok(AnnotationDefinition {
            id: id.as_str().to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
        })
    }

    async fn write_values(
        &self,
        device: &DeviceIdentity,
        values: &[AnnotationValue],
    ) -> Result<(), ApiError> {
        let attributes: Vec<Value> = values
            .iter()
            .map(|v| json!({"definitionId": v.definition_id, "values": [v.value]}))
            .collect();
        self.transport
            .execute(ApiRequest::patch(
                "annotation write",
                self.endpoints.device_annotations_path(device.as_str()),
                json!({ "extensionAttributes": attributes }),
            ))
            .await
            .map(drop)
    }
}
