use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::codegen::{generate_code, DEFAULT_CODE_LENGTH};
use crate::errors::AppError;
use crate::models::company::Company;
use crate::store::{constraints, Store};

/// Join code attempts before registration gives up. Each retry adds one
/// character of length.
pub const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct RegisterCompanyRequest {
    pub name: String,
    pub description: String,
    pub website: String,
}

fn duplicate_website(website: &str) -> AppError {
    AppError::Conflict(format!(
        "A company with the website {website} is already registered. \
         Please use a different website or contact support if this is your company."
    ))
}

pub async fn register_company(
    store: &dyn Store,
    request: RegisterCompanyRequest,
) -> Result<Company, AppError> {
    register_with(store, request, generate_code).await
}

async fn register_with<G>(
    store: &dyn Store,
    request: RegisterCompanyRequest,
    mut generate: G,
) -> Result<Company, AppError>
where
    G: FnMut(usize) -> String + Send,
{
    let name = request.name.trim().to_string();
    let website = request.website.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if website.is_empty() {
        return Err(AppError::Validation("website cannot be empty".to_string()));
    }

    if store.company_website_exists(&website).await? {
        warn!("Company with website {website} already exists");
        return Err(duplicate_website(&website));
    }

    for attempt in 0..MAX_CODE_ATTEMPTS {
        let code = generate(DEFAULT_CODE_LENGTH + attempt);
        if store.company_code_exists(&code).await? {
            warn!("Join code collision on attempt {}, regenerating", attempt + 1);
            continue;
        }

        let company = Company {
            id: Uuid::new_v4(),
            name: name.clone(),
            description: request.description.trim().to_string(),
            website: website.clone(),
            code,
            created_at: Utc::now(),
        };

        // The unique indexes settle races with concurrent registrations.
        match store.insert_company(&company).await {
            Ok(()) => {
                info!("Registered company {} ({})", company.id, company.website);
                return Ok(company);
            }
            Err(e) if e.violates(constraints::COMPANY_CODE) => {
                warn!("Join code taken at insert on attempt {}, regenerating", attempt + 1);
            }
            Err(e) if e.violates(constraints::COMPANY_WEBSITE) => {
                return Err(duplicate_website(&website));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Conflict(
        "Could not allocate a unique company code, please retry".to_string(),
    ))
}
