use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEntity {
    pub id: String,
    #[serde(default)]
    pub template: TemplateDto,
}

impl TemplateEntity {
    pub fn belongs_to_group(&self, group_id: &str) -> bool {
        self.template.group_id == group_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesEntity {
    #[serde(default)]
    pub templates: Vec<TemplateEntity>,
}

/// Body of `POST /process-groups/{id}/template-instance`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateTemplateRequest {
    pub template_id: String,
    pub origin_x: f64,
    pub origin_y: f64,
}
