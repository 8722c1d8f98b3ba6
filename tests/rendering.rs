use spark_components::{json, state, Component, ComponentOptions, Node};

fn component(template: &str, data: spark_components::StateMap) -> Component {
    let template = template.to_string();
    Component::new(ComponentOptions::new(template, move || data))
}

fn texts(root: &Node, selector: &str) -> Vec<String> {
    root.query_selector_all(selector)
        .unwrap()
        .iter()
        .map(Node::text_content)
        .collect()
}

#[test]
fn test_todo_list_renders_and_follows_state() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let c = component(
        r#"
        <h1>{{ title }} ({{ todos.length }})</h1>
        <ul v-if="state.todos.length > 0">
          <li v-for="todo in todos" class="todo">
            <span v-if="todo.done" class="done">{{ todo.text }}</span>
            <span v-else>{{ todo.text }}</span>
          </li>
        </ul>
        <p v-else class="empty">Nothing to do</p>
        "#,
        state!({
            "title": "Today",
            "todos": [
                { "text": "write", "done": true },
                { "text": "review", "done": false },
            ],
        }),
    );

    let root = c.element();
    assert_eq!(texts(root, "h1"), ["Today (2)"]);
    assert_eq!(root.query_selector_all("li.todo").unwrap().len(), 2);
    assert_eq!(texts(root, "span.done"), ["write"]);
    assert!(root.query_selector(".empty").unwrap().is_none());

    c.set_state(state!({ "todos": [] })).unwrap();
    assert_eq!(texts(root, "h1"), ["Today (0)"]);
    assert!(root.query_selector("ul").unwrap().is_none());
    assert_eq!(texts(root, ".empty"), ["Nothing to do"]);
}

#[test]
fn test_else_if_chain_tracks_each_branch() {
    let c = component(
        concat!(
            r#"<b v-if="state.score >= 90">A</b>"#,
            r#"<b v-else-if="state.score >= 75">B</b>"#,
            r#"<b v-else>C</b>"#,
        ),
        state!({ "score": 95 }),
    );

    let grade = |c: &Component| c.element().text_content();
    assert_eq!(grade(&c), "A");

    c.state().set("score", 80);
    assert_eq!(grade(&c), "B");

    c.state().set("score", 10);
    assert_eq!(grade(&c), "C");
    assert_eq!(c.render_count(), 3);
}

#[test]
fn test_nested_values_and_display_forms() {
    let c = component(
        "<p>{{ user.name }}|{{ user.age }}|{{ ratio }}|{{ tags }}|{{ user }}|{{ user.missing }}</p>",
        state!({
            "user": { "name": "Ada", "age": 36 },
            "ratio": 0.5,
            "tags": ["x", "y"],
        }),
    );
    assert_eq!(
        c.element().text_content(),
        "Ada|36|0.5|x,y|[object Object]|{{ user.missing }}"
    );
}

#[test]
fn test_conditions_use_script_semantics() {
    let c = component(
        concat!(
            r#"<i v-if="state.n == '1'">loose</i>"#,
            r#"<i v-if="state.n === '1'">strict</i>"#,
            r#"<i v-if="state.name + '!' === 'Ada!'">concat</i>"#,
            r#"<i v-if="!state.missing">missing</i>"#,
            r#"<i v-if="state.list && state.list[1] === 2">index</i>"#,
            r#"<i v-if="state.nothing.deeper">never</i>"#,
        ),
        state!({ "n": 1, "name": "Ada", "list": [1, 2], "nothing": null }),
    );
    assert_eq!(texts(c.element(), "i"), ["loose", "concat", "missing", "index"]);
}

#[test]
fn test_loop_item_writes_re_render_the_list() {
    let c = component(
        r#"<ol><li v-for="n in nums">{{ n }}</li></ol>"#,
        state!({ "nums": [1, 2, 3] }),
    );
    assert_eq!(texts(c.element(), "li"), ["1", "2", "3"]);

    c.state().update("nums", |nums| {
        if let Some(items) = nums.as_array_mut() {
            items.push(json!(4));
        }
    });
    assert_eq!(texts(c.element(), "li"), ["1", "2", "3", "4"]);
}

#[test]
fn test_markup_inside_attributes_survives_rendering() {
    let c = component(
        r#"<a href="/items?id={{ id }}&view=full" title="a > b">go</a>"#,
        state!({ "id": 7 }),
    );
    let link = c.element().first_child().unwrap();
    assert_eq!(link.get_attribute("href").as_deref(), Some("/items?id=7&view=full"));
    assert_eq!(link.get_attribute("title").as_deref(), Some("a > b"));
}
