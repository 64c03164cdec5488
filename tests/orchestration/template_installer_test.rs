//! Template installer tests: deploy with and without service reuse, undeploy

use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use nifi_deploy::config::LifecycleConfig;
use nifi_deploy::error::DeployError;
use nifi_deploy::models::{FlowDto, ProcessorState, TemplateDto, TemplateEntity};
use nifi_deploy::orchestration::{DeployRequest, TemplateInstaller};

use crate::mocks::{
    child_group, group_flow, processor, processor_with_property, service, with_children,
    MockFlowApi,
};

const TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<template encoding-version="1.2">
    <name>orders</name>
    <snippet>
        <controllerServices>
            <id>101</id>
            <name>pool-service</name>
        </controllerServices>
        <controllerServices>
            <id>102</id>
            <name>record-reader</name>
        </controllerServices>
        <processors>
            <id>p1</id>
            <name>PutDatabaseRecord</name>
        </processors>
    </snippet>
</template>"#;

fn installer(api: &MockFlowApi) -> TemplateInstaller {
    let config = LifecycleConfig {
        interval_ms: 10,
        timeout_ms: 200,
    };
    TemplateInstaller::new(Arc::new(api.clone()), &config)
}

fn branch(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn template_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(TEMPLATE.as_bytes()).unwrap();
    file
}

fn template(id: &str, group_id: &str) -> TemplateEntity {
    TemplateEntity {
        id: id.to_string(),
        template: TemplateDto {
            id: id.to_string(),
            group_id: group_id.to_string(),
            name: id.to_string(),
        },
    }
}

#[tokio::test]
async fn test_undeploy_missing_branch_is_a_no_op() {
    let api = MockFlowApi::new().with_root(group_flow("root-id", vec![], vec![]));

    installer(&api)
        .undeploy(&branch(&["root", "missing", "orders"]))
        .await
        .unwrap();

    assert_eq!(api.calls(), vec!["get_flow:root"]);
}

#[tokio::test]
async fn test_undeploy_removes_templates_stops_and_removes_group() {
    let root = with_children(group_flow("root-id", vec![], vec![]), vec![child_group("g1", "orders")]);
    let api = MockFlowApi::new()
        .with_root(root)
        .with_flow(group_flow("g1", vec![processor("a", ProcessorState::Running)], vec![]))
        .with_templates(vec![template("t1", "g1"), template("t2", "other")]);

    installer(&api)
        .undeploy(&branch(&["root", "orders"]))
        .await
        .unwrap();

    assert_eq!(
        api.calls(),
        vec![
            "get_flow:root",
            "get_flow:g1",
            "list_templates",
            "remove_template:t1",
            "update_processor_state:a:STOPPED",
            "get_process_group:g1",
            "remove_process_group:g1:7",
        ]
    );
}

#[tokio::test]
async fn test_undeploy_refuses_root() {
    let api = MockFlowApi::new();
    let err = installer(&api).undeploy(&branch(&["root"])).await.unwrap_err();
    assert!(matches!(err, DeployError::Configuration(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_deploy_uploads_template_and_starts_branch() {
    let api = MockFlowApi::new()
        .with_root(group_flow("root-id", vec![], vec![]))
        .with_instantiated(FlowDto {
            processors: vec![processor("p1", ProcessorState::Stopped)],
            ..FlowDto::default()
        });
    let file = template_file();
    let request = DeployRequest {
        branch: branch(&["root", "orders"]),
        template: file.path().to_path_buf(),
        reuse_services: false,
        start: true,
    };

    let group = installer(&api).deploy(&request).await.unwrap();

    assert_eq!(group.id(), "created-1");
    assert_eq!(group.flow().processors.len(), 1);
    assert_eq!(api.uploads(), vec![TEMPLATE.as_bytes().to_vec()]);
    assert_eq!(
        api.calls_of(&["instantiate_template"]),
        vec!["instantiate_template:created-1:uploaded-template:0:0"]
    );
    assert_eq!(
        api.calls_of(&["update_processor_state"]),
        vec!["update_processor_state:p1:RUNNING"]
    );
    assert!(api.calls_of(&["get_controller_services", "update_processor"]).is_empty());
}

#[tokio::test]
async fn test_deploy_reusing_parent_services() {
    let api = MockFlowApi::new()
        .with_root(group_flow("root-id", vec![], vec![]))
        .with_services(vec![service("target-1", "pool-service")])
        .with_instantiated(FlowDto {
            processors: vec![
                processor_with_property("p1", "Database Connection Pooling Service", "101"),
                processor_with_property("p2", "Record Reader", "102"),
            ],
            ..FlowDto::default()
        });
    let file = template_file();
    let request = DeployRequest {
        branch: branch(&["root", "orders"]),
        template: file.path().to_path_buf(),
        reuse_services: true,
        start: false,
    };

    installer(&api).deploy(&request).await.unwrap();

    let uploaded = String::from_utf8(api.uploads().remove(0)).unwrap();
    assert!(!uploaded.contains("pool-service"));
    assert!(uploaded.contains("<name>record-reader</name>"));
    assert!(uploaded.contains("<name>PutDatabaseRecord</name>"));

    let updated = api.updated_processors();
    let ids: Vec<&str> = updated.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);

    let p1 = &updated[0].component.config;
    assert_eq!(
        p1.properties["Database Connection Pooling Service"].as_deref(),
        Some("target-1")
    );
    let p2 = &updated[1].component.config;
    assert_eq!(p2.properties["Record Reader"].as_deref(), Some("102"));
    assert_eq!(p2.auto_terminated_relationships, Some(vec!["success".to_string()]));

    assert!(api.calls_of(&["update_processor_state"]).is_empty());
}

#[tokio::test]
async fn test_deploy_with_missing_template_file_fails() {
    let api = MockFlowApi::new().with_root(group_flow("root-id", vec![], vec![]));
    let request = DeployRequest {
        branch: branch(&["root", "orders"]),
        template: "/nonexistent/orders.xml".into(),
        reuse_services: true,
        start: false,
    };

    let err = installer(&api).deploy(&request).await.unwrap_err();
    assert!(matches!(err, DeployError::Io(_)));
    assert!(api.calls_of(&["upload_template"]).is_empty());
}
