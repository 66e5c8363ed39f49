pub mod boat_class;
pub mod discipline;
pub mod entrant;
pub mod event;
pub mod heat;
pub mod placement;
pub mod registration;
pub mod team;

pub use boat_class::{BoatClass, ClassKind, RoleTag};
pub use discipline::{AgeBand, AgeBands, DisciplineKey, Sex};
pub use entrant::Entrant;
pub use event::{ClassProgram, DrawSettings, Event, EventProgram, EventStatus};
pub use heat::{Competitor, Heat, HeatLane, Round};
pub use placement::Placement;
pub use registration::{Registration, RegistrationStatus};
pub use team::Team;

/// Stores a closed enumeration as its text form in a Postgres `TEXT` column.
///
/// The type must provide `as_str()` and a `FromStr` impl whose error is
/// [`crate::error::EngineError`].
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$ty>()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_column!(RoleTag);
text_column!(Sex);
text_column!(RegistrationStatus);
text_column!(EventStatus);
text_column!(Round);
