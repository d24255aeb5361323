//! Static field schemas, one per managed entity kind.
//!
//! Both the form and the table controllers read the same schema, so the field
//! set of a kind is fixed at compile time.

pub mod field;

pub use field::{FieldKind, FieldSpec};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Staff,
    Cage,
    Area,
    TrainerAccount,
    NewsItem,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Staff,
        EntityKind::Cage,
        EntityKind::Area,
        EntityKind::TrainerAccount,
        EntityKind::NewsItem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Staff => "staff",
            EntityKind::Cage => "cage",
            EntityKind::Area => "area",
            EntityKind::TrainerAccount => "trainer",
            EntityKind::NewsItem => "news",
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            EntityKind::Staff => &STAFF,
            EntityKind::Cage => &CAGE,
            EntityKind::Area => &AREA,
            EntityKind::TrainerAccount => &TRAINER,
            EntityKind::NewsItem => &NEWS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(EntityKind::Staff),
            "cage" => Ok(EntityKind::Cage),
            "area" => Ok(EntityKind::Area),
            "trainer" | "trainer_account" => Ok(EntityKind::TrainerAccount),
            "news" | "news_item" => Ok(EntityKind::NewsItem),
            other => Err(format!(
                "unknown entity '{}' (expected staff, cage, area, trainer or news)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateMethod {
    Put,
    Patch,
}

/// Where a table's filter options come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetSource {
    None,
    /// Fixed two-valued `isDeleted` enum
    Status,
    /// Distinct values of a field across the loaded rows
    Distinct(&'static str),
}

/// User-facing strings for one entity's pages
#[derive(Debug, Clone, Copy)]
pub struct EntityText {
    pub list_title: &'static str,
    pub list_description: &'static str,
    pub create_title: &'static str,
    pub create_description: &'static str,
    pub edit_title: &'static str,
    pub edit_description: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub delete_failed: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
    pub search_key: &'static str,
    pub facet: FacetSource,
    pub update_method: UpdateMethod,
    /// Guarded section the pages live under, e.g. `/staff`
    pub section: &'static str,
    pub slug: &'static str,
    pub text: EntityText,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn list_route(&self) -> String {
        format!("{}/{}", self.section, self.slug)
    }

    pub fn edit_route(&self, id: &str) -> String {
        format!("{}/{}/{}", self.section, self.slug, id)
    }

    pub fn new_route(&self) -> String {
        self.edit_route("new")
    }
}

pub const FAILURE_MESSAGE: &str = "Something went wrong.";

const PERSON_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("image", "Avatar Image", FieldKind::Image),
    FieldSpec::required("fullName", "Full Name", FieldKind::Text),
    FieldSpec::required("dob", "Date of birth", FieldKind::Date),
    FieldSpec::required("citizenId", "Citizen ID", FieldKind::Numeric),
    FieldSpec::required("email", "Email", FieldKind::Email),
    FieldSpec::required("phoneNumber", "Phone", FieldKind::Phone),
    FieldSpec::required("isDeleted", "Status", FieldKind::Status),
];

static STAFF: EntitySchema = EntitySchema {
    kind: EntityKind::Staff,
    fields: PERSON_FIELDS,
    search_key: "fullName",
    facet: FacetSource::Status,
    update_method: UpdateMethod::Patch,
    section: "/admin",
    slug: "manage-staffs",
    text: EntityText {
        list_title: "Staff",
        list_description: "Manage staff accounts in the zoo",
        create_title: "Create Staff Account",
        create_description: "Add a new staff account",
        edit_title: "Edit Staff Account",
        edit_description: "Edit a staff account.",
        created: "Staff account created.",
        updated: "Staff account updated.",
        deleted: "Staff account deleted.",
        delete_failed: "Fail to delete.",
    },
};

static TRAINER: EntitySchema = EntitySchema {
    kind: EntityKind::TrainerAccount,
    fields: PERSON_FIELDS,
    search_key: "fullName",
    facet: FacetSource::Status,
    update_method: UpdateMethod::Patch,
    section: "/staff",
    slug: "manage-trainers-account",
    text: EntityText {
        list_title: "Trainer",
        list_description: "Manage Trainers' account in the zoo",
        create_title: "Create Trainer Account",
        create_description: "Add a new trainer account",
        edit_title: "Edit Trainer Account",
        edit_description: "Edit a trainer account.",
        created: "Trainer account created.",
        updated: "Trainer account updated.",
        deleted: "Trainer account deleted.",
        delete_failed: "Fail to delete.",
    },
};

static CAGE: EntitySchema = EntitySchema {
    kind: EntityKind::Cage,
    fields: &[
        FieldSpec::required("name", "Name", FieldKind::Text).max_len(50),
        FieldSpec::required("maxCapacity", "Capacity", FieldKind::PositiveNumber),
        FieldSpec::required("areaID", "Area ID", FieldKind::Text).max_len(50),
    ],
    search_key: "name",
    facet: FacetSource::None,
    update_method: UpdateMethod::Put,
    section: "/staff",
    slug: "manage-cage",
    text: EntityText {
        list_title: "Cage",
        list_description: "Manage cages in the zoo",
        create_title: "Create new cage",
        create_description: "Add a new cage",
        edit_title: "Edit cage",
        edit_description: "Edit cage.",
        created: "New cage added.",
        updated: "Cage updated.",
        deleted: "Cage deleted.",
        delete_failed: "Fail to delete.",
    },
};

static AREA: EntitySchema = EntitySchema {
    kind: EntityKind::Area,
    fields: &[
        FieldSpec::required("name", "Name", FieldKind::Text).max_len(50),
        FieldSpec::optional("description", "Description", FieldKind::Text),
    ],
    search_key: "name",
    facet: FacetSource::None,
    update_method: UpdateMethod::Put,
    section: "/staff",
    slug: "manage-areas",
    text: EntityText {
        list_title: "Area",
        list_description: "Manage areas in the zoo",
        create_title: "Create new area",
        create_description: "Add a new area",
        edit_title: "Edit area",
        edit_description: "Edit area.",
        created: "New area added.",
        updated: "Area updated.",
        deleted: "Area deleted.",
        delete_failed: "Fail to delete.",
    },
};

static NEWS: EntitySchema = EntitySchema {
    kind: EntityKind::NewsItem,
    fields: &[
        FieldSpec::required("title", "Title", FieldKind::Text),
        FieldSpec::required("content", "Content", FieldKind::Text),
        FieldSpec::optional("image", "Cover Image", FieldKind::Image),
        FieldSpec::required("tags", "Tags", FieldKind::Tags),
    ],
    search_key: "title",
    facet: FacetSource::Distinct("tags"),
    update_method: UpdateMethod::Put,
    section: "/staff",
    slug: "manage-news",
    text: EntityText {
        list_title: "News",
        list_description: "Manage News information in the zoo",
        create_title: "Create news",
        create_description: "Add a new news item",
        edit_title: "Edit news",
        edit_description: "Edit news item.",
        created: "News created.",
        updated: "News updated.",
        deleted: "News deleted.",
        delete_failed: "Fail to delete.",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_own_schema() {
        for kind in EntityKind::ALL {
            let schema = kind.schema();
            assert_eq!(schema.kind, kind);
            assert!(schema.field(schema.search_key).is_some(), "{} search key", kind);
            if let FacetSource::Distinct(field) = schema.facet {
                assert!(schema.field(field).is_some());
            }
        }
    }

    #[test]
    fn routes_follow_the_navigation_menu() {
        assert_eq!(EntityKind::Staff.schema().list_route(), "/admin/manage-staffs");
        assert_eq!(EntityKind::Cage.schema().edit_route("7"), "/staff/manage-cage/7");
        assert_eq!(
            EntityKind::TrainerAccount.schema().new_route(),
            "/staff/manage-trainers-account/new"
        );
    }

    #[test]
    fn kinds_parse_from_cli_names() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(kind));
        }
        assert!("billboard".parse::<EntityKind>().is_err());
    }

    #[test]
    fn people_update_with_patch_others_with_put() {
        assert_eq!(EntityKind::Staff.schema().update_method, UpdateMethod::Patch);
        assert_eq!(EntityKind::Cage.schema().update_method, UpdateMethod::Put);
    }
}
