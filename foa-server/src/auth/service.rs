//! Identity flows over the store
//!
//! Accounts and profiles are written in one batch, so a failed sign-up or
//! staff creation never leaves an orphaned account behind.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Account, AccountKind, ChangePasswordRequest, Customer, CustomerSignup, LoginRequest,
    LoginResponse, SessionUser, Staff, StaffCreate, StaffRole,
};
use shared::util::{new_id, normalize_email, now_millis};

use super::password::{hash_password, verify_password};
use super::permissions::{CUSTOMER_ROLE, permissions_for_role};
use super::{CurrentUser, JwtService};
use crate::db::DocStore;
use crate::db::repository::{account, customer, staff};
use crate::security_log;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_email,
    validate_optional_text, validate_password, validate_required_text,
};

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn validate_signup(req: &CustomerSignup) -> AppResult<()> {
    validate_required_text(&req.first_name, "firstName", MAX_NAME_LEN)?;
    validate_required_text(&req.last_name, "lastName", MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_required_text(&req.contact, "contact", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&req.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.gender, "gender", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&req.image_url, "imageUrl", MAX_URL_LEN)?;
    Ok(())
}

/// Register a customer: account + profile, enabled
pub fn signup(store: &DocStore, req: CustomerSignup) -> AppResult<Customer> {
    validate_signup(&req)?;

    let email = normalize_email(&req.email);
    let now = now_millis();
    let account = Account {
        id: new_id(),
        email: email.clone(),
        password_hash: hash(&req.password)?,
        kind: AccountKind::Customer,
        created_at: now,
    };
    let profile = Customer {
        id: new_id(),
        uid: account.id.clone(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email,
        contact: req.contact.trim().to_string(),
        address: req.address.trim().to_string(),
        gender: req.gender,
        image_url: req.image_url,
        location: None,
        status: true,
        created_at: now,
    };

    let mut batch = store.batch()?;
    account::insert(&mut batch, &account)?;
    customer::insert(&mut batch, &profile)?;
    batch.commit()?;

    tracing::info!(customer_id = %profile.id, "Customer signed up");
    Ok(profile)
}

/// Look up an account of `kind` and check the password
///
/// Unknown email, wrong kind and wrong password all report
/// `InvalidCredentials` so the response does not reveal which accounts exist.
fn check_credentials(store: &DocStore, req: &LoginRequest, kind: AccountKind) -> AppResult<Account> {
    let found = account::find_by_email(store, &req.email)?.filter(|a| a.kind == kind);
    match found {
        Some(acc) if verify_password(&req.password, &acc.password_hash) => Ok(acc),
        Some(acc) => {
            security_log!("WARN", "login_failed", uid = acc.id.as_str(), reason = "invalid_password");
            Err(AppError::invalid_credentials())
        }
        None => {
            security_log!("WARN", "login_failed", email = req.email.as_str(), reason = "unknown_account");
            Err(AppError::invalid_credentials())
        }
    }
}

pub fn customer_session(profile: &Customer) -> SessionUser {
    SessionUser {
        id: profile.id.clone(),
        uid: profile.uid.clone(),
        email: profile.email.clone(),
        name: profile.full_name(),
        role: CUSTOMER_ROLE.to_string(),
        permissions: permissions_for_role(CUSTOMER_ROLE),
    }
}

pub fn staff_session(member: &Staff) -> SessionUser {
    let role = member.role.as_str();
    SessionUser {
        id: member.id.clone(),
        uid: member.uid.clone(),
        email: member.email.clone(),
        name: member.name.clone(),
        role: role.to_string(),
        permissions: permissions_for_role(role),
    }
}

/// Customer sign-in; disabled customers are refused
pub fn authenticate_customer(store: &DocStore, req: &LoginRequest) -> AppResult<SessionUser> {
    let acc = check_credentials(store, req, AccountKind::Customer)?;
    let profile = customer::find_by_uid(store, &acc.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    if !profile.status {
        security_log!("WARN", "login_refused", uid = acc.id.as_str(), reason = "disabled");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(customer_session(&profile))
}

/// Dashboard sign-in; the role must be one of `dashboard_roles`
pub fn authenticate_staff(
    store: &DocStore,
    req: &LoginRequest,
    dashboard_roles: &[String],
) -> AppResult<SessionUser> {
    let acc = check_credentials(store, req, AccountKind::Staff)?;
    let member = staff::find_by_uid(store, &acc.id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
    if !dashboard_roles.iter().any(|r| r == member.role.as_str()) {
        security_log!("WARN", "login_refused", uid = acc.id.as_str(), reason = "role");
        return Err(AppError::new(ErrorCode::DashboardAccessDenied)
            .with_detail("role", member.role.as_str()));
    }
    if !member.status {
        security_log!("WARN", "login_refused", uid = acc.id.as_str(), reason = "disabled");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(staff_session(&member))
}

/// Sign a session into a login response
pub fn issue_token(jwt: &JwtService, user: SessionUser) -> AppResult<LoginResponse> {
    let (token, expires_at) = jwt.generate_token(&user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok(LoginResponse {
        token,
        expires_at,
        user,
    })
}

/// Session view of the caller, rebuilt from the live profile
pub fn current_session(store: &DocStore, user: &CurrentUser) -> AppResult<SessionUser> {
    if user.is_customer() {
        let profile = customer::find_by_id(store, &user.id)?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
        Ok(customer_session(&profile))
    } else {
        let member = staff::find_by_id(store, &user.id)?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound))?;
        Ok(staff_session(&member))
    }
}

pub fn change_password(store: &DocStore, uid: &str, req: ChangePasswordRequest) -> AppResult<()> {
    validate_password(&req.new_password)?;
    let acc = account::find_by_id(store, uid)?.ok_or_else(AppError::not_authenticated)?;
    if !verify_password(&req.current_password, &acc.password_hash) {
        security_log!("WARN", "password_change_failed", uid = uid);
        return Err(AppError::invalid_credentials());
    }
    account::update_password(store, uid, hash(&req.new_password)?)?;
    security_log!("INFO", "password_changed", uid = uid);
    Ok(())
}

fn validate_staff(req: &StaffCreate) -> AppResult<()> {
    validate_email(&req.email)?;
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&req.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&req.image, "image", MAX_URL_LEN)?;
    Ok(())
}

/// Create a staff member with a sign-in account using `password`
pub fn create_staff(store: &DocStore, req: StaffCreate, password: &str) -> AppResult<Staff> {
    validate_staff(&req)?;

    let email = normalize_email(&req.email);
    let now = now_millis();
    let acc = Account {
        id: new_id(),
        email: email.clone(),
        password_hash: hash(password)?,
        kind: AccountKind::Staff,
        created_at: now,
    };
    let role = req.role.unwrap_or_default();
    let member = Staff {
        id: new_id(),
        uid: acc.id.clone(),
        email,
        name: req.name.trim().to_string(),
        phone: req.phone.trim().to_string(),
        address: req.address.trim().to_string(),
        role,
        location: req.location.filter(|l| !l.is_empty()),
        image: req.image,
        status: true,
        created_at: now,
    };

    let mut batch = store.batch()?;
    staff::insert(&mut batch, &member)?;
    account::insert(&mut batch, &acc)?;
    batch.commit()?;

    tracing::info!(staff_id = %member.id, role = %role.as_str(), "Staff member created");
    Ok(member)
}

/// Seed a `super` staff account when the roster is empty
pub fn bootstrap_admin(store: &DocStore, email: &str, password: &str) -> AppResult<Option<Staff>> {
    if staff::count(store)? > 0 {
        return Ok(None);
    }
    validate_password(password)?;
    let member = create_staff(
        store,
        StaffCreate {
            email: email.to_string(),
            name: "Administrator".into(),
            phone: "N/A".into(),
            address: "N/A".into(),
            role: Some(StaffRole::Super),
            location: None,
            image: None,
        },
        password,
    )?;
    security_log!("INFO", "bootstrap_admin_created", staff_id = member.id.as_str());
    Ok(Some(member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collection;
    use shared::models::Location;

    fn signup_req(email: &str) -> CustomerSignup {
        CustomerSignup {
            first_name: "Ama".into(),
            last_name: "Mensah".into(),
            email: email.into(),
            password: "secret1".into(),
            contact: "0241234567".into(),
            address: "12 Ring Road".into(),
            gender: Some("female".into()),
            image_url: None,
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    fn staff_req(email: &str, role: Option<StaffRole>) -> StaffCreate {
        StaffCreate {
            email: email.into(),
            name: "Kojo".into(),
            phone: "0200000000".into(),
            address: "Osu".into(),
            role,
            location: None,
            image: None,
        }
    }

    #[test]
    fn signup_then_login() {
        let store = DocStore::open_in_memory().unwrap();
        let profile = signup(&store, signup_req("Ama@Example.com")).unwrap();
        assert_eq!(profile.email, "ama@example.com");
        assert!(profile.status);

        let session = authenticate_customer(&store, &login("ama@example.com", "secret1")).unwrap();
        assert_eq!(session.id, profile.id);
        assert_eq!(session.role, CUSTOMER_ROLE);
        assert_eq!(session.name, "Ama Mensah");

        let err = authenticate_customer(&store, &login("ama@example.com", "wrong!")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        let err = authenticate_customer(&store, &login("nobody@example.com", "secret1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
    }

    #[test]
    fn duplicate_signup_leaves_no_partial_records() {
        let store = DocStore::open_in_memory().unwrap();
        signup(&store, signup_req("ama@example.com")).unwrap();
        let err = signup(&store, signup_req("AMA@example.com")).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
        assert_eq!(store.count(Collection::Accounts).unwrap(), 1);
        assert_eq!(store.count(Collection::Customers).unwrap(), 1);
    }

    #[test]
    fn signup_validates_input() {
        let store = DocStore::open_in_memory().unwrap();
        let mut req = signup_req("ama@example.com");
        req.password = "123".into();
        assert_eq!(signup(&store, req).unwrap_err().code, ErrorCode::PasswordTooShort);

        let mut req = signup_req("not-an-email");
        req.first_name = "Ama".into();
        assert_eq!(signup(&store, req).unwrap_err().code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn disabled_customer_cannot_login() {
        let store = DocStore::open_in_memory().unwrap();
        let profile = signup(&store, signup_req("ama@example.com")).unwrap();
        customer::toggle_status(&store, &profile.id).unwrap();
        let err = authenticate_customer(&store, &login("ama@example.com", "secret1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
    }

    #[test]
    fn staff_login_gates_on_role_and_status() {
        let store = DocStore::open_in_memory().unwrap();
        let roles = vec!["super".to_string()];
        let boss = create_staff(&store, staff_req("boss@example.com", Some(StaffRole::Super)), "123456").unwrap();
        create_staff(&store, staff_req("clerk@example.com", None), "123456").unwrap();

        let session = authenticate_staff(&store, &login("boss@example.com", "123456"), &roles).unwrap();
        assert_eq!(session.id, boss.id);
        assert_eq!(session.permissions, vec!["all"]);

        let err = authenticate_staff(&store, &login("clerk@example.com", "123456"), &roles).unwrap_err();
        assert_eq!(err.code, ErrorCode::DashboardAccessDenied);

        staff::toggle_status(&store, &boss.id).unwrap();
        let err = authenticate_staff(&store, &login("boss@example.com", "123456"), &roles).unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
    }

    #[test]
    fn accounts_do_not_cross_surfaces() {
        let store = DocStore::open_in_memory().unwrap();
        signup(&store, signup_req("ama@example.com")).unwrap();
        create_staff(&store, staff_req("boss@example.com", Some(StaffRole::Super)), "123456").unwrap();

        let roles = vec!["super".to_string()];
        let err = authenticate_staff(&store, &login("ama@example.com", "secret1"), &roles).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        let err = authenticate_customer(&store, &login("boss@example.com", "123456")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
    }

    #[test]
    fn delivery_guy_needs_a_location() {
        let store = DocStore::open_in_memory().unwrap();
        let err = create_staff(&store, staff_req("rider@example.com", Some(StaffRole::DeliveryGuy)), "123456")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DeliveryLocationRequired);
        assert_eq!(store.count(Collection::Accounts).unwrap(), 0);

        store
            .insert(
                Collection::Locations,
                "loc-1",
                &Location {
                    id: "loc-1".into(),
                    name: "Osu".into(),
                    price: 10.0,
                    status: true,
                    created_at: 0,
                },
            )
            .unwrap();
        let mut req = staff_req("rider@example.com", Some(StaffRole::DeliveryGuy));
        req.location = Some("loc-1".into());
        let rider = create_staff(&store, req, "123456").unwrap();
        assert_eq!(rider.location.as_deref(), Some("loc-1"));
    }

    #[test]
    fn change_password_requires_current() {
        let store = DocStore::open_in_memory().unwrap();
        let profile = signup(&store, signup_req("ama@example.com")).unwrap();

        let bad = ChangePasswordRequest {
            current_password: "nope".into(),
            new_password: "newpass1".into(),
        };
        assert_eq!(
            change_password(&store, &profile.uid, bad).unwrap_err().code,
            ErrorCode::InvalidCredentials
        );

        let good = ChangePasswordRequest {
            current_password: "secret1".into(),
            new_password: "newpass1".into(),
        };
        change_password(&store, &profile.uid, good).unwrap();
        assert!(authenticate_customer(&store, &login("ama@example.com", "newpass1")).is_ok());
    }

    #[test]
    fn bootstrap_only_on_empty_roster() {
        let store = DocStore::open_in_memory().unwrap();
        let first = bootstrap_admin(&store, "root@example.com", "rootpass").unwrap();
        assert_eq!(first.unwrap().role, StaffRole::Super);
        assert!(bootstrap_admin(&store, "other@example.com", "rootpass").unwrap().is_none());
    }
}
