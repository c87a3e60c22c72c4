//! Built-in resource types and data sources
//!
//! Each type is pure data: attribute names, remote field names, flags and
//! defaults. The engine does the rest.

use declarative::{AttrType, AttributeSpec, ResourceSchema, SchemaRegistry};

pub const USER: &str = "salesforce_user";
pub const USER_ROLE: &str = "salesforce_user_role";
pub const PROFILE: &str = "salesforce_profile";
pub const USER_LICENSE: &str = "salesforce_user_license";

/// Profile permission flags exposed as attributes, with their remote names
const PROFILE_PERMISSIONS: &[(&str, &str)] = &[
    ("permissions_api_enabled", "PermissionsApiEnabled"),
    ("permissions_email_single", "PermissionsEmailSingle"),
    ("permissions_email_mass", "PermissionsEmailMass"),
    ("permissions_edit_task", "PermissionsEditTask"),
    ("permissions_edit_event", "PermissionsEditEvent"),
    ("permissions_export_report", "PermissionsExportReport"),
    ("permissions_run_reports", "PermissionsRunReports"),
    ("permissions_view_setup", "PermissionsViewSetup"),
    ("permissions_manage_users", "PermissionsManageUsers"),
    ("permissions_view_all_data", "PermissionsViewAllData"),
    ("permissions_modify_all_data", "PermissionsModifyAllData"),
    ("permissions_password_never_expires", "PermissionsPasswordNeverExpires"),
];

fn user() -> ResourceSchema {
    let string = |name: &str, remote: &str| AttributeSpec::required(name, AttrType::String).remote(remote);
    let defaulted = |name: &str, remote: &str, default: &str| {
        AttributeSpec::optional(name, AttrType::String)
            .and_computed()
            .remote(remote)
            .with_default(default)
    };

    // users cannot be deleted, only deactivated
    ResourceSchema::new(USER, "User")
        .attribute(string("alias", "Alias"))
        .attribute(string("email", "Email"))
        .attribute(string("last_name", "LastName"))
        .attribute(string("profile_id", "ProfileId"))
        .attribute(string("username", "Username"))
        .attribute(defaulted("email_encoding_key", "EmailEncodingKey", "UTF-8"))
        .attribute(defaulted("language_locale_key", "LanguageLocaleKey", "en_US"))
        .attribute(defaulted("locale_sid_key", "LocaleSidKey", "en_US"))
        .attribute(defaulted("time_zone_sid_key", "TimeZoneSidKey", "America/New_York"))
        .attribute(AttributeSpec::optional("user_role_id", AttrType::String).remote("UserRoleId"))
        .attribute(
            AttributeSpec::optional("reset_password", AttrType::Bool)
                .local()
                .with_default(false),
        )
        .deactivate_with("IsActive")
        .reset_password_with("reset_password")
}

fn user_role() -> ResourceSchema {
    ResourceSchema::new(USER_ROLE, "UserRole")
        .attribute(AttributeSpec::required("name", AttrType::String).remote("Name"))
        .attribute(AttributeSpec::required("developer_name", AttrType::String).remote("DeveloperName"))
        .attribute(AttributeSpec::optional("parent_role_id", AttrType::String).remote("ParentRoleId"))
}

fn profile() -> ResourceSchema {
    let schema = ResourceSchema::new(PROFILE, "Profile")
        .attribute(AttributeSpec::required("name", AttrType::String).remote("Name"))
        .attribute(AttributeSpec::optional("description", AttrType::String).remote("Description"))
        .attribute(
            AttributeSpec::required("user_license_id", AttrType::String)
                .immutable()
                .remote("UserLicenseId"),
        )
        .refresh_after_write();

    PROFILE_PERMISSIONS.iter().fold(schema, |schema, (name, remote)| {
        schema.attribute(
            AttributeSpec::optional(*name, AttrType::Bool)
                .and_computed()
                .remote(*remote),
        )
    })
}

/// Registry with every built-in resource type
pub fn registry() -> declarative::Result<SchemaRegistry> {
    SchemaRegistry::builder()
        .register(user())
        .register(user_role())
        .register(profile())
        .build()
}

/// Profiles are found by name
fn profile_source() -> ResourceSchema {
    ResourceSchema::new(PROFILE, "Profile")
        .attribute(AttributeSpec::required("name", AttrType::String).remote("Name"))
        .attribute(AttributeSpec::computed("user_license_id", AttrType::String).remote("UserLicenseId"))
}

/// Licenses are found by their definition key, e.g. `SFDC`
fn user_license_source() -> ResourceSchema {
    ResourceSchema::new(USER_LICENSE, "UserLicense")
        .attribute(
            AttributeSpec::required("license_definition_key", AttrType::String)
                .remote("LicenseDefinitionKey"),
        )
        .attribute(AttributeSpec::computed("name", AttrType::String).remote("Name"))
}

/// Registry with every built-in data source
pub fn data_sources() -> declarative::Result<SchemaRegistry> {
    SchemaRegistry::builder()
        .register(profile_source())
        .register(user_license_source())
        .build()
}
