/*!
 * Timeline extraction for generated animation scripts.
 *
 * The script is parsed with tree-sitter's Python grammar. Only the direct
 * statements of the scene's `construct` method are inspected, and every
 * `self.play(...)` / `self.add(...)` expression statement becomes one
 * animation event, in source order.
 */

use std::collections::VecDeque;

use log::{debug, error};
use tree_sitter::{Node, Parser, Tree};

use crate::errors::InjectionError;
use crate::script::syntax::check_syntax;

/// Name of the routine that holds the scene's animation sequence
pub const CONSTRUCT_METHOD: &str = "construct";

/// Receiver of animation calls inside `construct`
const EVENT_RECEIVER: &str = "self";

/// Method names that count as animation events
pub const EVENT_METHODS: [&str; 2] = ["play", "add"];

/// Scene class used when the script defines no class at all
pub const DEFAULT_SCENE_NAME: &str = "MainScene";

/// One recognized animation statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationEvent {
    /// 0-based position in the timeline
    pub ordinal: usize,
    /// 1-based line on which the statement ends
    pub end_line: usize,
    /// Leading whitespace of the statement's line, reused for injected lines
    pub indent: String,
    /// `construct`'s body is written on the `def` line itself, so nothing
    /// can be inserted after this statement
    pub inline_body: bool,
}

/// Ordered animation events of one `construct` method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub events: Vec<AnimationEvent>,
}

impl Timeline {
    /// Whether `construct` contained at least one animation event
    pub fn found(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event for an ordinal, if the ordinal is in range
    pub fn get(&self, ordinal: i64) -> Option<&AnimationEvent> {
        usize::try_from(ordinal).ok().and_then(|i| self.events.get(i))
    }

    pub fn last(&self) -> Option<&AnimationEvent> {
        self.events.last()
    }
}

/// Parse script text, failing on any syntax error
fn parse_script(script: &str) -> Result<Tree, InjectionError> {
    check_syntax(script).map_err(InjectionError::InvalidScript)?;

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| InjectionError::InvalidScript(format!("parser setup failed: {}", e)))?;

    let tree = parser
        .parse(script, None)
        .ok_or_else(|| InjectionError::InvalidScript("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let location = first_error(root)
            .map(|node| {
                let pos = node.start_position();
                format!("line {}, column {}", pos.row + 1, pos.column + 1)
            })
            .unwrap_or_else(|| "unknown location".to_string());
        error!("Failed to parse generated script: syntax error at {}", location);
        return Err(InjectionError::InvalidScript(format!("syntax error at {}", location)));
    }

    Ok(tree)
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Breadth-first search for the first node accepted by `predicate`
fn find_breadth_first<'t>(root: Node<'t>, predicate: impl Fn(Node<'t>) -> bool) -> Option<Node<'t>> {
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if predicate(node) {
            return Some(node);
        }
        let mut cursor = node.walk();
        queue.extend(node.named_children(&mut cursor));
    }
    None
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Whether a statement is `self.<play|add>(...)` used as a statement
fn is_animation_call(statement: Node<'_>, source: &str) -> bool {
    if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
        return false;
    }
    let Some(call) = statement.named_child(0).filter(|n| n.kind() == "call") else {
        return false;
    };
    let Some(function) = call
        .child_by_field_name("function")
        .filter(|n| n.kind() == "attribute")
    else {
        return false;
    };

    let receiver_is_self = function
        .child_by_field_name("object")
        .is_some_and(|obj| obj.kind() == "identifier" && node_text(obj, source) == EVENT_RECEIVER);
    let method_matches = function
        .child_by_field_name("attribute")
        .is_some_and(|attr| EVENT_METHODS.contains(&node_text(attr, source)));

    receiver_is_self && method_matches
}

/// Text between the start of a node's line and the node
fn line_prefix<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    let start = node.start_byte();
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    &source[line_start..start]
}

/// Leading whitespace of the line a node starts on
fn line_indent(node: Node<'_>, source: &str) -> String {
    line_prefix(node, source)
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect()
}

/// Whether a block is written on its header line (`def f(self): ...`)
fn is_inline_block(block: Node<'_>, source: &str) -> bool {
    let mut cursor = block.walk();
    let first_statement = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first_statement.is_some_and(|statement| !line_prefix(statement, source).trim().is_empty())
}

/// Extract the animation timeline from a generated script
///
/// # Errors
/// * `InjectionError::InvalidScript` if the script does not parse
/// * `InjectionError::MissingConstruct` if no `construct` method exists
pub fn extract_timeline(script: &str) -> Result<Timeline, InjectionError> {
    let tree = parse_script(script)?;

    let construct = find_breadth_first(tree.root_node(), |node| {
        node.kind() == "function_definition"
            && node
                .child_by_field_name("name")
                .is_some_and(|name| node_text(name, script) == CONSTRUCT_METHOD)
    })
    .ok_or_else(|| {
        error!("Audio injection failed: no '{}' method in generated scene", CONSTRUCT_METHOD);
        InjectionError::MissingConstruct
    })?;

    let Some(body) = construct.child_by_field_name("body") else {
        return Ok(Timeline::default());
    };

    let inline_body = is_inline_block(body, script);
    let mut cursor = body.walk();
    let events: Vec<AnimationEvent> = body
        .named_children(&mut cursor)
        .filter(|statement| is_animation_call(*statement, script))
        .enumerate()
        .map(|(ordinal, statement)| AnimationEvent {
            ordinal,
            end_line: statement.end_position().row + 1,
            indent: line_indent(statement, script),
            inline_body,
        })
        .collect();

    debug!(
        "Extracted {} animation event(s) ending at lines {:?}",
        events.len(),
        events.iter().map(|e| e.end_line).collect::<Vec<_>>()
    );

    Ok(Timeline { events })
}

/// Name of the first class defined in the script
///
/// Falls back to [`DEFAULT_SCENE_NAME`] when the script has no class or
/// cannot be parsed.
pub fn discover_scene_name(script: &str) -> String {
    let Ok(tree) = parse_script(script) else {
        return DEFAULT_SCENE_NAME.to_string();
    };

    find_breadth_first(tree.root_node(), |node| node.kind() == "class_definition")
        .and_then(|class| class.child_by_field_name("name"))
        .map(|name| node_text(name, script).to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SCENE_NAME.to_string())
}
