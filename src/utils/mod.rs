pub mod template_xml;
