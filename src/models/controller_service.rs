use serde::{Deserialize, Serialize};

/// Shared service referenced by id from processor properties.
///
/// Two services describe the same logical service when their names are equal,
/// whatever their ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerServiceDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerServiceEntity {
    pub id: String,
    #[serde(default)]
    pub component: ControllerServiceDto,
}

impl ControllerServiceEntity {
    pub fn name(&self) -> &str {
        &self.component.name
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.component.name == name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerServicesEntity {
    #[serde(default)]
    pub controller_services: Vec<ControllerServiceEntity>,
}
