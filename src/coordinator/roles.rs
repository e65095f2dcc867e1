/// Role rules: unique names, read-only built-ins, and user references
use crate::{
    coordinator::users,
    error::{MockError, MockResult},
    store::{Role, Store, User},
};

fn not_found(name: &str) -> MockError {
    MockError::NotFound(format!("No role found with name {}", name))
}

pub fn get<'a>(store: &'a Store, name: &str) -> MockResult<&'a Role> {
    store.roles.get(name).ok_or_else(|| not_found(name))
}

fn get_writable<'a>(store: &'a Store, name: &str, action: &str) -> MockResult<&'a Role> {
    let role = get(store, name)?;
    if role.read_only {
        return Err(MockError::Conflict(format!(
            "Cannot {} read only role {}",
            action, name
        )));
    }
    Ok(role)
}

pub fn create(store: &mut Store, mut role: Role) -> MockResult<Role> {
    if store.roles.contains(&role.name) {
        return Err(MockError::Duplicate(format!(
            "Role {} already exists.",
            role.name
        )));
    }

    role.read_only = false;
    store.roles.put(role.name.clone(), role.clone());
    Ok(role)
}

/// Replace a role; a new name is carried over to every member
pub fn update(store: &mut Store, name: &str, mut role: Role) -> MockResult<Role> {
    get_writable(store, name, "update")?;
    role.read_only = false;

    if role.name != name {
        if store.roles.contains(&role.name) {
            return Err(MockError::Duplicate(format!(
                "Role {} already exists.",
                role.name
            )));
        }
        store.roles.delete(name);
        for user in store.users.values_mut() {
            for assigned in user.roles.iter_mut().filter(|assigned| *assigned == name) {
                *assigned = role.name.clone();
            }
        }
    }

    store.roles.put(role.name.clone(), role.clone());
    Ok(role)
}

pub fn delete(store: &mut Store, name: &str) -> MockResult<()> {
    get_writable(store, name, "delete")?;

    let members: Vec<&str> = store
        .users
        .list()
        .into_iter()
        .filter(|user| user.roles.iter().any(|role| role == name))
        .map(|user| user.username.as_str())
        .collect();
    if !members.is_empty() {
        return Err(MockError::Conflict(format!(
            "Role {} is still assigned to users: {}",
            name,
            members.join(", ")
        )));
    }

    store.roles.delete(name);
    Ok(())
}

pub fn members<'a>(store: &'a Store, name: &str) -> MockResult<Vec<&'a User>> {
    get(store, name)?;
    Ok(store
        .users
        .list()
        .into_iter()
        .filter(|user| user.roles.iter().any(|role| role == name))
        .collect())
}

pub fn add_member(store: &mut Store, name: &str, username: &str) -> MockResult<()> {
    get(store, name)?;
    let user = store
        .users
        .get_mut(username)
        .ok_or_else(|| users::not_found(username))?;

    if !user.roles.iter().any(|role| role == name) {
        user.roles.push(name.to_string());
    }
    Ok(())
}

pub fn remove_member(store: &mut Store, name: &str, username: &str) -> MockResult<()> {
    get(store, name)?;
    let user = store
        .users
        .get_mut(username)
        .ok_or_else(|| users::not_found(username))?;

    user.roles.retain(|role| role != name);
    Ok(())
}
