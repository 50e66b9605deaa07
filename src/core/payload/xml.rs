//! DXF2 XML metadata documents
//!
//! User roles and users are imported as XML `<metadata>` documents. Every
//! object element carries `id`, `code`, `created` and `lastUpdated`
//! attributes; references to other objects are empty elements with an `id`.

use super::Payload;
use crate::domain::{Result, SeedError, Uid, User, UserRole};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use secrecy::ExposeSecret;
use std::io::Cursor;

/// DXF2 namespace
pub const DXF_NAMESPACE: &str = "http://dhis2.org/schema/dxf/2.0";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn xml_error<E: std::fmt::Display>(err: E) -> SeedError {
    SeedError::Serialization(format!("XML write failed: {err}"))
}

/// Thin event writer for one metadata document
struct MetadataDocument {
    writer: Writer<Cursor<Vec<u8>>>,
    timestamp: String,
}

impl MetadataDocument {
    fn new(timestamp: DateTime<Utc>) -> Result<Self> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        let mut root = BytesStart::new("metadata");
        root.push_attribute(("xmlns", DXF_NAMESPACE));
        writer.write_event(Event::Start(root)).map_err(xml_error)?;

        Ok(Self {
            writer,
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_error)
    }

    fn start_object(&mut self, name: &str, id: &Uid, code: &str, display: &str) -> Result<()> {
        let mut element = BytesStart::new(name);
        element.push_attribute(("id", id.as_str()));
        element.push_attribute(("code", code));
        element.push_attribute(("name", display));
        element.push_attribute(("created", self.timestamp.as_str()));
        element.push_attribute(("lastUpdated", self.timestamp.as_str()));
        self.writer
            .write_event(Event::Start(element))
            .map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn text(&mut self, name: &str, value: &str) -> Result<()> {
        self.start(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(xml_error)?;
        self.end(name)
    }

    fn references(&mut self, collection: &str, item: &str, ids: &[Uid]) -> Result<()> {
        self.start(collection)?;
        for id in ids {
            let mut element = BytesStart::new(item);
            element.push_attribute(("id", id.as_str()));
            self.writer
                .write_event(Event::Empty(element))
                .map_err(xml_error)?;
        }
        self.end(collection)
    }

    fn finish(mut self) -> Result<Payload> {
        self.end("metadata")?;
        let bytes = self.writer.into_inner().into_inner();
        let doc = String::from_utf8(bytes).map_err(xml_error)?;
        Ok(Payload::Xml(doc))
    }
}

/// `<metadata><userRoles>...</userRoles></metadata>`
pub fn user_roles_xml(roles: &[UserRole], timestamp: DateTime<Utc>) -> Result<Payload> {
    let mut doc = MetadataDocument::new(timestamp)?;

    doc.start("userRoles")?;
    for role in roles {
        doc.start_object("userRole", &role.id, &role.code, &role.name)?;
        if let Some(description) = &role.description {
            doc.text("description", description)?;
        }
        doc.start("authorities")?;
        for authority in &role.authorities {
            doc.text("authority", authority)?;
        }
        doc.end("authorities")?;
        doc.end("userRole")?;
    }
    doc.end("userRoles")?;

    doc.finish()
}

/// `<metadata><users>...</users></metadata>`
///
/// Passwords are written in clear text, as the import endpoint requires.
pub fn users_xml(users: &[User], timestamp: DateTime<Utc>) -> Result<Payload> {
    let mut doc = MetadataDocument::new(timestamp)?;

    doc.start("users")?;
    for user in users {
        let display = format!("{} {}", user.first_name, user.surname);
        doc.start_object("user", &user.id, &user.code, &display)?;
        doc.text("firstName", &user.first_name)?;
        doc.text("surname", &user.surname)?;
        if let Some(email) = &user.email {
            doc.text("email", email)?;
        }
        doc.text("username", &user.username)?;
        doc.text("password", user.password.expose_secret().as_ref())?;
        doc.references("userRoles", "userRole", &user.roles)?;
        doc.references("organisationUnits", "organisationUnit", &user.org_units)?;
        doc.references(
            "dataViewOrganisationUnits",
            "dataViewOrganisationUnit",
            &user.org_units,
        )?;
        doc.end("user")?;
    }
    doc.end("users")?;

    doc.finish()
}
