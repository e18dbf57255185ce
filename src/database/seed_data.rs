use sea_orm::*;
use tracing::debug;

use crate::database::entities::success_factors;
use crate::legacy_ids::factor_uuid;

/// (legacy slug, title, description)
pub const SUCCESS_FACTOR_CATALOG: &[(&str, &str, &str)] = &[
    (
        "sf-1",
        "Clear purpose",
        "Everyone involved can state why the project exists and what it must change.",
    ),
    (
        "sf-2",
        "Committed sponsor",
        "A senior sponsor owns the outcome and removes obstacles when asked.",
    ),
    (
        "sf-3",
        "Engaged stakeholders",
        "The people affected by the project are identified early and kept involved.",
    ),
    (
        "sf-4",
        "Realistic scope",
        "The scope fits the time, budget and people actually available.",
    ),
    (
        "sf-5",
        "Capable team",
        "The team has, or can quickly gain, the skills the work requires.",
    ),
    (
        "sf-6",
        "Effective communication",
        "Information reaches the right people in time for them to act on it.",
    ),
    (
        "sf-7",
        "Adaptive planning",
        "Plans are revisited as the project learns, rather than defended.",
    ),
    (
        "sf-8",
        "Risk awareness",
        "Risks are named openly, owned and reviewed throughout the project.",
    ),
    (
        "sf-9",
        "Adequate resources",
        "Funding, tools and time are secured before they become blockers.",
    ),
    (
        "sf-10",
        "User involvement",
        "End users shape what is delivered and test it before it is final.",
    ),
    (
        "sf-11",
        "Measurable outcomes",
        "Success is defined in terms that can be checked when the project closes.",
    ),
    (
        "sf-12",
        "Learning culture",
        "Lessons are captured during the project and fed into the next one.",
    ),
];

/// Insert every catalog entry that is missing. Entries still stored under
/// their legacy slug count as present. Returns the number inserted.
pub async fn seed_success_factors<C>(db: &C) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
{
    let mut inserted = 0;

    for (position, (legacy_id, title, description)) in SUCCESS_FACTOR_CATALOG.iter().enumerate() {
        let id = factor_uuid(legacy_id).to_string();

        let existing = success_factors::Entity::find()
            .filter(
                Condition::any()
                    .add(success_factors::Column::Id.eq(id.clone()))
                    .add(success_factors::Column::Id.eq(*legacy_id)),
            )
            .one(db)
            .await?;

        if existing.is_some() {
            continue;
        }

        debug!("Seeding success factor {} ({})", legacy_id, title);
        success_factors::ActiveModel {
            id: Set(id),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            position: Set(position as i32 + 1),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}
