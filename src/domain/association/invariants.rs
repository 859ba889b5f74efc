use super::entity::{Association, AssociationKind, AssociationOptions, AssociationRoute};
use crate::domain::{DomainError, DomainResult};

/// Turn a raw declaration into an [`Association`], enforcing the
/// declaration-local invariants. Cross-references to other entity types and
/// associations are checked when the registry is sealed.
pub fn validate_association(
    owner: &str,
    name: &str,
    kind: AssociationKind,
    target: &str,
    options: AssociationOptions,
) -> DomainResult<Association> {
    require_name("owner entity type", owner)?;
    require_name("association name", name)?;
    require_name("target entity type", target)?;

    let route = match kind {
        AssociationKind::OwnsMany | AssociationKind::BelongsTo => {
            if options.through.is_some() || options.source.is_some() {
                return Err(DomainError::InvalidDeclaration(format!(
                    "{} association '{}.{}' does not take 'through'/'source'",
                    kind, owner, name
                )));
            }
            let foreign_key = options.foreign_key.ok_or_else(|| {
                DomainError::InvalidDeclaration(format!(
                    "{} association '{}.{}' requires an explicit foreign key",
                    kind, owner, name
                ))
            })?;
            require_name("foreign key", &foreign_key)?;

            if kind == AssociationKind::OwnsMany {
                AssociationRoute::OwnsMany { foreign_key }
            } else {
                AssociationRoute::BelongsTo { foreign_key }
            }
        }
        AssociationKind::IndirectMany => {
            if options.foreign_key.is_some() {
                return Err(DomainError::InvalidDeclaration(format!(
                    "indirect-many association '{}.{}' does not take a foreign key",
                    owner, name
                )));
            }
            let (through, source) = match (options.through, options.source) {
                (Some(through), Some(source)) => (through, source),
                _ => {
                    return Err(DomainError::InvalidDeclaration(format!(
                        "indirect-many association '{}.{}' requires both 'through' and 'source'",
                        owner, name
                    )))
                }
            };
            require_name("through association", &through)?;
            require_name("source association", &source)?;

            if through == name {
                return Err(DomainError::InvalidDeclaration(format!(
                    "indirect-many association '{}.{}' cannot route through itself",
                    owner, name
                )));
            }

            AssociationRoute::IndirectMany { through, source }
        }
    };

    Ok(Association {
        owner: owner.to_string(),
        name: name.to_string(),
        target: target.to_string(),
        route,
    })
}

fn require_name(what: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidDeclaration(format!(
            "{} cannot be empty",
            what
        )));
    }
    Ok(())
}
