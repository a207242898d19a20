//! Squashing combines two attribute values without discarding information from either.
//!
//! Unlike a merge, a squash never sorts or de-duplicates: the result holds every element of both
//! inputs, first input first. Recognized shapes:
//!
//! - absent
//! - a list
//! - `select({...})` with string keys
//! - `[...] + select({...})`, list on the left

use crate::error::{ShapeIssue, SquashError};
use bzlfix_syntax::{Comments, Expr, ExprKind};
use std::collections::HashMap;

/// Elements and comments of a list literal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPart {
    pub elements: Vec<Expr>,
    pub comments: Comments,
}

/// A `select(dict)` call, with the comments of each node it is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectPart {
    pub entries: Vec<Expr>,
    pub dict_comments: Comments,
    pub call_comments: Comments,
    pub callee_comments: Comments,
}

/// Decoded shape of an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Absent,
    List(ListPart),
    Select(SelectPart),
    ListPlusSelect {
        list: ListPart,
        select: SelectPart,
        op_comments: Comments,
    },
}

impl Shape {
    pub fn decode(expr: Option<&Expr>) -> Result<Shape, SquashError> {
        let Some(expr) = expr else {
            return Ok(Shape::Absent);
        };
        match &expr.kind {
            ExprKind::List { .. } => Ok(Shape::List(decode_list(expr)?)),
            ExprKind::Call { .. } => Ok(Shape::Select(decode_select(expr)?)),
            ExprKind::Binary { left, op, right } => {
                if op != "+" {
                    return Err(ShapeIssue::Operator(op.clone()).into());
                }
                let list = decode_list(left)?;
                let select = match &right.kind {
                    ExprKind::Call { .. } => decode_select(right)?,
                    _ => return Err(ShapeIssue::RightNotSelect.into()),
                };
                Ok(Shape::ListPlusSelect {
                    list,
                    select,
                    op_comments: expr.comments.clone(),
                })
            }
            ExprKind::Literal { .. } => Err(ShapeIssue::Unsupported("literal").into()),
            ExprKind::Str { .. } => Err(ShapeIssue::Unsupported("string").into()),
            ExprKind::Dict { .. } => Err(ShapeIssue::Unsupported("bare dict").into()),
            ExprKind::KeyValue { .. } => Err(ShapeIssue::Unsupported("key-value").into()),
        }
    }

    fn into_parts(self) -> Parts {
        match self {
            Shape::Absent => Parts::default(),
            Shape::List(list) => Parts {
                list: Some(list),
                ..Parts::default()
            },
            Shape::Select(select) => Parts {
                select: Some(select),
                ..Parts::default()
            },
            Shape::ListPlusSelect {
                list,
                select,
                op_comments,
            } => Parts {
                list: Some(list),
                select: Some(select),
                op_comments,
            },
        }
    }
}

#[derive(Debug, Default)]
struct Parts {
    list: Option<ListPart>,
    select: Option<SelectPart>,
    op_comments: Comments,
}

impl Parts {
    fn encode(self) -> Option<Expr> {
        let list = self.list.map(|l| Expr::list(l.elements).with_comments(l.comments));
        let select = self.select.map(|s| {
            Expr::call(
                Expr::literal("select").with_comments(s.callee_comments),
                vec![Expr::dict(s.entries).with_comments(s.dict_comments)],
            )
            .with_comments(s.call_comments)
        });
        match (list, select) {
            (None, None) => None,
            (Some(list), None) => Some(list),
            (None, Some(select)) => Some(select),
            (Some(list), Some(select)) => {
                Some(Expr::binary(list, "+", select).with_comments(self.op_comments))
            }
        }
    }
}

fn decode_list(expr: &Expr) -> Result<ListPart, SquashError> {
    match &expr.kind {
        ExprKind::List { elements } => Ok(ListPart {
            elements: elements.clone(),
            comments: expr.comments.clone(),
        }),
        _ => Err(ShapeIssue::LeftNotList.into()),
    }
}

fn decode_select(expr: &Expr) -> Result<SelectPart, SquashError> {
    let ExprKind::Call { callee, args, .. } = &expr.kind else {
        return Err(ShapeIssue::RightNotSelect.into());
    };
    match callee.as_literal() {
        Some("select") => {}
        Some(other) => return Err(ShapeIssue::NotSelect(other.to_string()).into()),
        None => return Err(ShapeIssue::NotSelect("<expression>".to_string()).into()),
    }
    let [arg] = args.as_slice() else {
        return Err(ShapeIssue::SelectArgument.into());
    };
    let ExprKind::Dict { entries } = &arg.kind else {
        return Err(ShapeIssue::SelectArgument.into());
    };
    for entry in entries {
        if let ExprKind::KeyValue { key, .. } = &entry.kind
            && key.as_str().is_none()
        {
            return Err(ShapeIssue::NonStringKey.into());
        }
    }
    Ok(SelectPart {
        entries: entries.clone(),
        dict_comments: arg.comments.clone(),
        call_comments: expr.comments.clone(),
        callee_comments: callee.comments.clone(),
    })
}

/// Squashes `y` into `x`. `Ok(None)` only when both are absent.
pub fn squash_expr(x: Option<&Expr>, y: Option<&Expr>) -> Result<Option<Expr>, SquashError> {
    let x = Shape::decode(x)?.into_parts();
    let y = Shape::decode(y)?.into_parts();

    let squashed = Parts {
        list: squash_list(x.list, y.list),
        select: squash_select(x.select, y.select)?,
        op_comments: x.op_comments.concat(&y.op_comments),
    };
    Ok(squashed.encode())
}

/// `x`'s elements followed by `y`'s, comments concatenated group by group.
pub fn squash_list(x: Option<ListPart>, y: Option<ListPart>) -> Option<ListPart> {
    match (x, y) {
        (None, y) => y,
        (x, None) => x,
        (Some(mut x), Some(y)) => {
            x.comments.append(&y.comments);
            x.elements.extend(y.elements);
            Some(x)
        }
    }
}

/// Appends `y`'s cases to `x`'s. Cases present in both are squashed in `x`'s position.
pub fn squash_select(
    x: Option<SelectPart>,
    y: Option<SelectPart>,
) -> Result<Option<SelectPart>, SquashError> {
    let (mut x, y) = match (x, y) {
        (None, y) => return Ok(y),
        (x, None) => return Ok(x),
        (Some(x), Some(y)) => (x, y),
    };
    x.dict_comments.append(&y.dict_comments);
    x.call_comments.append(&y.call_comments);
    x.callee_comments.append(&y.callee_comments);

    let mut cases: HashMap<String, usize> = HashMap::new();
    for (i, entry) in x.entries.iter().enumerate() {
        if let Some(key) = case_key(entry) {
            cases.entry(key.to_string()).or_insert(i);
        }
    }

    for entry in y.entries {
        let Some(key) = case_key(&entry).map(str::to_string) else {
            // Splats and other unrecognized entries pass through verbatim.
            x.entries.push(entry);
            continue;
        };
        match cases.get(&key) {
            Some(&i) => squash_case(&mut x.entries[i], &entry)?,
            None => {
                cases.insert(key, x.entries.len());
                x.entries.push(entry);
            }
        }
    }
    Ok(Some(x))
}

fn case_key(entry: &Expr) -> Option<&str> {
    match &entry.kind {
        ExprKind::KeyValue { key, .. } => key.as_str(),
        _ => None,
    }
}

/// Squashes the value of `y` into `x`, both `"key": value` entries with the same key.
fn squash_case(x: &mut Expr, y: &Expr) -> Result<(), SquashError> {
    let (ExprKind::KeyValue { key: xk, value: xv }, ExprKind::KeyValue { key: yk, value: yv }) =
        (&mut x.kind, &y.kind)
    else {
        return Ok(());
    };
    if let Some(squashed) = squash_expr(Some(&**xv), Some(&**yv))? {
        **xv = squashed;
    }
    xk.comments.append(&yk.comments);
    x.comments.append(&y.comments);
    Ok(())
}
