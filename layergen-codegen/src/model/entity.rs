use layergen_catalog::TableRef;

use super::FieldType;

/// A generated enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    /// Database type name, schema-qualified outside the default schema
    pub db_name: String,
    pub constants: Vec<EnumConstant>,
    pub comment: Option<String>,
    /// Module path the enum is reachable through
    pub import_path: String,
}

/// One enum variant and the database value it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: String,
    pub value: String,
}

/// Serialization rename targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub json: Option<String>,
    pub db: Option<String>,
    /// Form field name of request payloads
    pub form: Option<String>,
}

impl Tag {
    /// Name a payload field is read under: the form name when forms are
    /// on, the json name otherwise.
    pub fn payload(&self) -> Option<&str> {
        self.form.as_deref().or(self.json.as_deref())
    }
}

/// A struct field bound to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Resolved name (`AuthorID`)
    pub name: String,
    /// Rust identifier (`author_id`, `r#type`)
    pub ident: String,
    /// Originating column name
    pub column: String,
    pub ty: FieldType,
    pub tag: Tag,
    pub comment: Option<String>,
}

/// The single-column primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    /// Index into [`Struct::fields`]
    pub field: usize,
    /// True for serial columns the database fills in on insert
    pub generated: bool,
}

/// A generated struct for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name: String,
    pub table: TableRef,
    pub fields: Vec<Field>,
    pub id: Option<PrimaryKey>,
    pub comment: Option<String>,
    /// Module path the struct is reachable through
    pub import_path: String,
}

impl Struct {
    /// True when the table has exactly one primary-key column.
    pub fn id_exists(&self) -> bool {
        self.id.is_some()
    }

    pub fn id_field(&self) -> Option<&Field> {
        self.id.as_ref().map(|pk| &self.fields[pk.field])
    }

    /// Type of the primary-key column.
    pub fn id_type(&self) -> Option<&FieldType> {
        self.id_field().map(|f| &f.ty)
    }

    /// Fields bound on insert: every field except a generated key.
    pub fn insert_fields(&self) -> impl Iterator<Item = &Field> {
        let skip = self
            .id
            .as_ref()
            .filter(|pk| pk.generated)
            .map(|pk| pk.field);
        self.fields
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != skip)
            .map(|(_, f)| f)
    }

    /// Fields set on update: every field except the key.
    pub fn update_fields(&self) -> impl Iterator<Item = &Field> {
        let skip = self.id.as_ref().map(|pk| pk.field);
        self.fields
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != skip)
            .map(|(_, f)| f)
    }

    /// True when an update statement has something to set.
    pub fn updatable(&self) -> bool {
        self.id.is_some() && self.update_fields().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SemanticType;

    fn field(name: &str, ty: SemanticType) -> Field {
        Field {
            name: name.into(),
            ident: name.to_lowercase(),
            column: name.to_lowercase(),
            ty: FieldType::new(ty),
            tag: Tag::default(),
            comment: None,
        }
    }

    fn post(generated: bool) -> Struct {
        Struct {
            name: "Post".into(),
            table: TableRef::new("public", "posts"),
            fields: vec![
                field("ID", SemanticType::Int),
                field("Title", SemanticType::String),
            ],
            id: Some(PrimaryKey {
                field: 0,
                generated,
            }),
            comment: None,
            import_path: "crate::model".into(),
        }
    }

    #[test]
    fn test_id_accessors() {
        let post = post(true);
        assert!(post.id_exists());
        assert_eq!(post.id_field().unwrap().name, "ID");
        assert_eq!(post.id_type().unwrap().base, SemanticType::Int);
        assert!(post.updatable());
    }

    #[test]
    fn test_insert_fields_skip_generated_key() {
        let names: Vec<_> = post(true).insert_fields().map(|f| f.ident.clone()).collect();
        assert_eq!(names, vec!["title"]);

        let names: Vec<_> = post(false).insert_fields().map(|f| f.ident.clone()).collect();
        assert_eq!(names, vec!["id", "title"]);
    }

    #[test]
    fn test_update_fields_skip_key() {
        let names: Vec<_> = post(false).update_fields().map(|f| f.ident.clone()).collect();
        assert_eq!(names, vec!["title"]);
    }
}
