/// User rules: unique usernames and existing roles
use crate::{
    coordinator::generate_id,
    error::{MockError, MockResult},
    store::{Store, User, UserPatch},
};

pub(crate) fn not_found(name: &str) -> MockError {
    MockError::NotFound(format!("No user found with name {}", name))
}

fn ensure_roles_exist(store: &Store, roles: &[String]) -> MockResult<()> {
    match roles.iter().find(|role| !store.roles.contains(role)) {
        Some(role) => Err(MockError::Validation(format!(
            "No role found with name {}",
            role
        ))),
        None => Ok(()),
    }
}

pub fn get<'a>(store: &'a Store, name: &str) -> MockResult<&'a User> {
    store.users.get(name).ok_or_else(|| not_found(name))
}

pub fn create(store: &mut Store, mut user: User) -> MockResult<User> {
    if store.users.contains(&user.username) {
        return Err(MockError::Duplicate(format!(
            "User {} already exists.",
            user.username
        )));
    }
    ensure_roles_exist(store, &user.roles)?;

    user.id = generate_id(&store.users);
    store.users.put(user.username.clone(), user.clone());
    Ok(user)
}

pub fn update(store: &mut Store, name: &str, patch: UserPatch) -> MockResult<User> {
    let mut user = get(store, name)?.clone();
    patch.apply(&mut user);
    ensure_roles_exist(store, &user.roles)?;

    store.users.put(name, user.clone());
    Ok(user)
}

pub fn delete(store: &mut Store, name: &str) -> MockResult<()> {
    store.users.delete(name).map(|_| ()).ok_or_else(|| not_found(name))
}
