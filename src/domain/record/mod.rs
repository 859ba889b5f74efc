pub mod entity;
pub mod invariants;
pub mod predicate;

pub use entity::{pluck, Record, RecordId};
pub use invariants::validate_record_fields;
pub use predicate::Predicate;

/// Build a [`FieldMap`](crate::domain::FieldMap) from `name => value` pairs.
///
/// ```ignore
/// let fields = fields! { "title" => "I am posting!", "user_id" => sara.id };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::domain::FieldMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::domain::FieldMap::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::domain::Value::from($value),
            );
        )+
        map
    }};
}
