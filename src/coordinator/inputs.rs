use crate::{
    coordinator::generate_id,
    error::{MockError, MockResult},
    store::{Input, Store},
};
use chrono::Utc;

fn not_found(id: &str) -> MockError {
    MockError::NotFound(format!("Input <{}> not found!", id))
}

pub fn get<'a>(store: &'a Store, id: &str) -> MockResult<&'a Input> {
    store.inputs.get(id).ok_or_else(|| not_found(id))
}

pub fn create(store: &mut Store, mut input: Input) -> MockResult<Input> {
    if input.id.is_empty() {
        input.id = generate_id(&store.inputs);
    } else if store.inputs.contains(&input.id) {
        return Err(MockError::Duplicate(format!(
            "Input {} already exists.",
            input.id
        )));
    }

    input.created_at.get_or_insert_with(Utc::now);
    store.inputs.put(input.id.clone(), input.clone());
    Ok(input)
}

/// Replace an input; id and creation time are kept
pub fn update(store: &mut Store, id: &str, mut input: Input) -> MockResult<Input> {
    let existing = get(store, id)?;

    input.id = id.to_string();
    input.created_at = existing.created_at;
    store.inputs.put(id, input.clone());
    Ok(input)
}

pub fn delete(store: &mut Store, id: &str) -> MockResult<()> {
    store.inputs.delete(id).map(|_| ()).ok_or_else(|| not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::seed;
    use serde_json::{json, Map};

    fn gelf() -> Input {
        let mut configuration = Map::new();
        configuration.insert("bind_address".to_string(), json!("0.0.0.0"));
        configuration.insert("port".to_string(), json!(12201));
        Input {
            id: String::new(),
            title: "GELF UDP".to_string(),
            input_type: "org.graylog2.inputs.gelf.udp.GELFUDPInput".to_string(),
            configuration,
            global: true,
            node: None,
            created_at: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let mut store = seed();
        let created = create(&mut store, gelf()).unwrap();

        assert_eq!(created.id.len(), 24);
        assert!(created.created_at.is_some());
        assert_eq!(get(&store, &created.id).unwrap(), &created);
    }

    #[test]
    fn test_duplicate_explicit_id() {
        let mut store = seed();
        let mut input = gelf();
        input.id = "000000000000000000000001".to_string();
        create(&mut store, input.clone()).unwrap();

        assert!(matches!(create(&mut store, input), Err(MockError::Duplicate(_))));
    }

    #[test]
    fn test_update_keeps_identity() {
        let mut store = seed();
        let created = create(&mut store, gelf()).unwrap();
        let mut changed = gelf();
        changed.title = "GELF TCP".to_string();

        let updated = update(&mut store, &created.id, changed).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(get(&store, &created.id).unwrap().title, "GELF TCP");
    }

    #[test]
    fn test_delete_missing() {
        let mut store = seed();
        assert!(matches!(delete(&mut store, "nope"), Err(MockError::NotFound(_))));
        assert!(matches!(
            update(&mut store, "nope", gelf()),
            Err(MockError::NotFound(_))
        ));
    }
}
