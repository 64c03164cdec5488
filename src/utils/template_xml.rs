/*!
 * Template document helpers.
 *
 * NiFi templates are XML documents. The deployer only needs three things from them:
 * the controller services a template declares (id and name), a copy of the document
 * without some of those declarations, and the id of a freshly uploaded template.
 * Everything else in the document is passed through byte-for-byte.
 */

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

use crate::error::{DeployError, Result};
use crate::models::{ControllerServiceDto, TemplateDto, TemplateEntity};

const SNIPPET: &str = "snippet";
const CONTROLLER_SERVICES: &str = "controllerServices";

fn xml_error(e: quick_xml::Error) -> DeployError {
    DeployError::template_error(format!("Malformed template XML: {e}"))
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Element path `[root, snippet, controllerServices]`
fn is_declared_service(path: &[String]) -> bool {
    path.len() == 3 && path[1] == SNIPPET && path[2] == CONTROLLER_SERVICES
}

/// Call `on_text` with the element path and unescaped text of every text node
fn walk_text<F>(xml: &str, mut on_text: F) -> Result<()>
where
    F: FnMut(&[String], &str),
{
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => path.push(element_name(e.name().as_ref())),
            Event::End(_) => {
                path.pop();
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(xml_error)?;
                on_text(&path, &text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                on_text(&path, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Controller services declared at the top level of a template snippet
pub fn declared_services(xml: &str) -> Result<Vec<ControllerServiceDto>> {
    let mut services: Vec<ControllerServiceDto> = Vec::new();
    let mut current: Option<ControllerServiceDto> = None;
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                path.push(element_name(e.name().as_ref()));
                if is_declared_service(&path) {
                    current = Some(ControllerServiceDto::default());
                }
            }
            Event::End(_) => {
                if is_declared_service(&path) {
                    services.extend(current.take());
                }
                path.pop();
            }
            Event::Text(e) if path.len() == 4 && is_declared_service(&path[..3]) => {
                let text = e.unescape().map_err(xml_error)?;
                if let Some(service) = current.as_mut() {
                    match path[3].as_str() {
                        "id" => service.id = text.trim().to_string(),
                        "name" => service.name = text.trim().to_string(),
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(services)
}

/// Service-name cache: declared service id to declared service name
pub fn service_id_to_name(xml: &str) -> Result<HashMap<String, String>> {
    Ok(declared_services(xml)?
        .into_iter()
        .filter(|service| !service.id.is_empty())
        .map(|service| (service.id, service.name))
        .collect())
}

/// Copy of the template keeping only the declared services `keep` accepts
pub fn retain_services<F>(xml: &str, keep: F) -> Result<String>
where
    F: Fn(&ControllerServiceDto) -> bool,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut path: Vec<String> = Vec::new();
    let mut buffered: Vec<Event<'static>> = Vec::new();
    let mut service: Option<ControllerServiceDto> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                path.push(element_name(e.name().as_ref()));
                if is_declared_service(&path) {
                    service = Some(ControllerServiceDto::default());
                }
            }
            Event::Text(e) if service.is_some() && path.len() == 4 => {
                let text = e.unescape().map_err(xml_error)?.trim().to_string();
                if let Some(current) = service.as_mut() {
                    match path[3].as_str() {
                        "id" => current.id = text,
                        "name" => current.name = text,
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        if service.is_none() {
            writer.write_event(&event).map_err(xml_error)?;
            if matches!(event, Event::End(_)) {
                path.pop();
            }
            continue;
        }

        let closes_service = matches!(event, Event::End(_)) && is_declared_service(&path);
        buffered.push(event.into_owned());
        if matches!(buffered.last(), Some(Event::End(_))) {
            path.pop();
        }

        if closes_service {
            if let Some(declared) = service.take() {
                if keep(&declared) {
                    for event in buffered.drain(..) {
                        writer.write_event(&event).map_err(xml_error)?;
                    }
                } else {
                    buffered.clear();
                }
            }
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| DeployError::template_error(format!("Template is not valid UTF-8: {e}")))
}

/// Template entity returned by the upload endpoint (`templateEntity/template/...`)
pub fn parse_template_entity(xml: &str) -> Result<TemplateEntity> {
    let mut template = TemplateDto::default();
    walk_text(xml, |path, text| {
        if path.len() == 3 && path[1] == "template" {
            match path[2].as_str() {
                "id" => template.id = text.trim().to_string(),
                "groupId" => template.group_id = text.trim().to_string(),
                "name" => template.name = text.trim().to_string(),
                _ => {}
            }
        }
    })?;

    if template.id.is_empty() {
        return Err(DeployError::template_error(
            "Upload response does not contain a template id",
        ));
    }
    Ok(TemplateEntity {
        id: template.id.clone(),
        template,
    })
}
