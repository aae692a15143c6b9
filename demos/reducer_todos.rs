//! Todo list driven by a reducer, restored from the cache on remount.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tincache::store::MemoryStore;
use tincache::{CacheConfig, Cached, Component, Hook};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct TodoItem {
    id: usize,
    title: String,
    completed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Todos {
    items: Vec<TodoItem>,
}

enum Action {
    Add(String),
    Toggle(usize),
}

fn reduce(state: &Todos, action: Action) -> Todos {
    let mut next = state.clone();
    match action {
        Action::Add(title) => {
            let id = next.items.len();
            next.items.push(TodoItem {
                id,
                title,
                completed: false,
            });
        }
        Action::Toggle(id) => {
            if let Some(item) = next.items.iter_mut().find(|t| t.id == id) {
                item.completed = !item.completed;
            }
        }
    }
    next
}

fn print(todos: &Todos) {
    for item in &todos.items {
        let mark = if item.completed { "x" } else { " " };
        println!("   [{mark}] {}", item.title);
    }
}

fn main() -> tincache::Result<()> {
    println!("=== Reducer Todos ===\n");

    let store = Arc::new(MemoryStore::isolated());
    let todos = Cached::configure(store, CacheConfig::new("demo:todos"))?.wrap(Hook::Reducer);

    println!("1. First mount starts empty");
    let component = Component::new();
    let (_, dispatch, _) = component.render(|| todos.use_reducer(reduce, Todos::default()))?;

    println!("\n2. Adding and toggling");
    dispatch.dispatch(Action::Add("Write the reducer".to_string()));
    dispatch.dispatch(Action::Add("Cache the state".to_string()));
    dispatch.dispatch(Action::Toggle(0));
    let (state, _, _) = component.render(|| todos.use_reducer(reduce, Todos::default()))?;
    print(&state);

    println!("\n3. A new component resumes from the cache");
    let other = Component::new();
    let (state, dispatch, invalidate) = other.render(|| todos.use_reducer(reduce, Todos::default()))?;
    print(&state);

    dispatch.dispatch(Action::Toggle(1));
    let (state, _, _) = other.render(|| todos.use_reducer(reduce, Todos::default()))?;
    print(&state);

    println!("\n4. Invalidating the cache");
    invalidate();
    let fresh = Component::new();
    let (state, _, _) = fresh.render_without_commit(|| todos.use_reducer(reduce, Todos::default()))?;
    println!("   {} items after invalidation", state.items.len());

    println!("\n✓ Done");
    Ok(())
}
