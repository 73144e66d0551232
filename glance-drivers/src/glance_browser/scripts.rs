//! In-page scripts executed through WebDriver's `execute` command.
//!
//! Each script is a function body; arguments arrive as `arguments[n]`.
//! Mutating scripts return `{ ok, error }` so failures inside the page come
//! back as values rather than WebDriver errors.

macro_rules! viewport_expr {
    () => {
        "({ width: window.innerWidth, height: window.innerHeight, \
           scroll_x: window.pageXOffset, scroll_y: window.pageYOffset, \
           content_width: document.documentElement.scrollWidth, \
           content_height: document.documentElement.scrollHeight })"
    };
}

pub const RENDER_TREE: &str = concat!(
    r#"
const nodes = [];
const visit = (el, parent) => {
  const key = nodes.length;
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  const attributes = {};
  for (const a of Array.from(el.attributes)) attributes[a.name] = a.value;
  let ownText = '';
  for (const c of Array.from(el.childNodes)) {
    if (c.nodeType === Node.TEXT_NODE) ownText += c.textContent;
  }
  const z = parseInt(style.zIndex, 10);
  const opacity = parseFloat(style.opacity);
  const node = {
    tag: el.tagName.toLowerCase(),
    attributes,
    own_text: ownText,
    rect: { x: rect.left, y: rect.top, width: rect.width, height: rect.height },
    style: {
      display: style.display,
      visibility: style.visibility,
      opacity: Number.isNaN(opacity) ? 1 : opacity,
      cursor: style.cursor,
      position: style.position,
      z_index: Number.isNaN(z) ? null : z,
    },
    has_click_handler: typeof el.onclick === 'function' || el.hasAttribute('onclick'),
    disabled: !!el.disabled,
    content_editable: !!el.isContentEditable,
    parent,
    children: [],
  };
  nodes.push(node);
  for (const child of Array.from(el.children)) node.children.push(visit(child, key));
  return key;
};
visit(document.body || document.documentElement, null);
return { nodes, root: 0, location: window.location.href, viewport: "#,
    viewport_expr!(),
    " };"
);

pub const VIEWPORT: &str = concat!("return ", viewport_expr!(), ";");

pub const READY_STATE: &str = "return document.readyState;";

pub const HIT_TEST: &str = r#"
const el = document.elementFromPoint(arguments[0], arguments[1]);
if (!el) return null;
const tag = el.tagName.toLowerCase();
return {
  tag,
  id: el.id || null,
  class: typeof el.className === 'string' && el.className ? el.className : null,
  is_form_control: tag === 'input' || tag === 'textarea' || tag === 'select',
};
"#;

/// `arguments`: kind (`move`/`down`/`up`/`wheel`), x, y, delta_x, delta_y.
pub const DISPATCH_POINTER: &str = r#"
const [kind, x, y, dx, dy] = arguments;
const el = document.elementFromPoint(x, y) || document.body;
const init = { bubbles: true, cancelable: true, view: window, clientX: x, clientY: y };
switch (kind) {
  case 'move':
    el.dispatchEvent(new MouseEvent('mousemove', init));
    break;
  case 'down':
    window.__glancePressed = el;
    el.dispatchEvent(new MouseEvent('mousedown', init));
    break;
  case 'up': {
    el.dispatchEvent(new MouseEvent('mouseup', init));
    const pressed = window.__glancePressed;
    window.__glancePressed = null;
    if (pressed === el || (pressed && pressed.contains(el))) el.click();
    break;
  }
  case 'wheel':
    el.dispatchEvent(new WheelEvent('wheel', { ...init, deltaX: dx, deltaY: dy }));
    window.scrollBy(dx, dy);
    break;
  default:
    return { ok: false, error: 'unknown pointer event ' + kind };
}
return { ok: true };
"#;

pub const CLICK_AT: &str = r#"
const el = document.elementFromPoint(arguments[0], arguments[1]);
if (!el) return { ok: false, error: 'No element found' };
el.click();
return { ok: true };
"#;

pub const FOCUS_AT: &str = r#"
const el = document.elementFromPoint(arguments[0], arguments[1]);
if (!el) return { ok: false, error: 'No element found' };
el.focus();
if (el.value && typeof el.select === 'function') el.select();
return { ok: true };
"#;

/// `arguments`: x, y, pressed.
pub const SHOW_CURSOR: &str = r#"
let cursor = document.getElementById('glance-cursor');
if (!cursor) {
  cursor = document.createElement('div');
  cursor.id = 'glance-cursor';
  Object.assign(cursor.style, {
    position: 'fixed', width: '16px', height: '16px', borderRadius: '50%',
    border: '2px solid rgba(255, 0, 0, 0.8)', pointerEvents: 'none',
    zIndex: '2147483647', transform: 'translate(-50%, -50%)',
  });
  (document.body || document.documentElement).appendChild(cursor);
}
cursor.style.left = arguments[0] + 'px';
cursor.style.top = arguments[1] + 'px';
cursor.style.backgroundColor = arguments[2] ? 'rgba(255, 0, 0, 0.5)' : 'rgba(255, 0, 0, 0.3)';
return { ok: true };
"#;

pub const FIELD_KIND: &str = r#"
const el = document.querySelector(arguments[0]);
if (!el) return { kind: 'missing' };
if (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA') return { kind: 'text_entry' };
if (el.isContentEditable) return { kind: 'content_editable' };
return { kind: 'other', tag: el.tagName.toLowerCase() };
"#;

pub const SET_NATIVE_VALUE: &str = r#"
const [selector, value] = arguments;
const el = document.querySelector(selector);
if (!el) return { ok: false, error: 'Element not found with selector' };
if (document.activeElement && document.activeElement !== el) document.activeElement.blur();
el.value = '';
el.focus();
const proto = el.tagName === 'TEXTAREA' ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
const setter = Object.getOwnPropertyDescriptor(proto, 'value')?.set;
if (setter) setter.call(el, value); else el.value = value;
return { ok: true };
"#;

/// `arguments`: selector, `[{ type, key? }]`.
pub const DISPATCH_EVENTS: &str = r#"
const [selector, events] = arguments;
const el = document.querySelector(selector);
if (!el) return { ok: false, error: 'Element not found with selector' };
for (const ev of events) {
  if (ev.type === 'input' || ev.type === 'change') {
    el.dispatchEvent(new Event(ev.type, { bubbles: true }));
  } else if (ev.key === 'Enter') {
    el.dispatchEvent(new KeyboardEvent(ev.type, { key: 'Enter', code: 'Enter', keyCode: 13, bubbles: true }));
  } else {
    el.dispatchEvent(new KeyboardEvent(ev.type, { key: ev.key, code: 'Key' + ev.key.toUpperCase(), bubbles: true }));
  }
}
return { ok: true };
"#;

/// `arguments`: selector, `[{ cmd, text? }]`.
pub const EDIT: &str = r#"
const [selector, commands] = arguments;
const el = document.querySelector(selector);
if (!el) return { ok: false, error: 'Element not found with selector' };
el.focus();
try {
  for (const c of commands) document.execCommand(c.cmd, false, c.text ?? null);
} catch (e) {
  return { ok: false, error: 'Failed to set content: ' + e.toString() };
}
return { ok: true };
"#;

pub const ASSIGN_VALUE: &str = r#"
const [selector, value] = arguments;
const el = document.querySelector(selector);
if (!el) return { ok: false, error: 'Element not found with selector' };
el.focus();
if ('value' in el) el.value = value; else el.textContent = value;
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return { ok: true };
"#;

/// `arguments`: selector, mode (`label`/`value`/`index`), needle.
pub const SELECT_NATIVE: &str = r#"
const [selector, mode, needle] = arguments;
const el = document.querySelector(selector);
if (!el || !el.options) return { ok: false, error: 'Element not found with selector' };
const options = Array.from(el.options);
let index = -1;
if (mode === 'label') index = options.findIndex(o => (o.label || o.text).trim() === needle);
else if (mode === 'value') index = options.findIndex(o => o.value === needle);
else if (mode === 'index') index = needle < options.length ? needle : -1;
if (index < 0) return { ok: true, selected: false };
el.selectedIndex = index;
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return { ok: true, selected: true };
"#;

pub const OPTION_NODES: &str = r#"
const found = document.querySelectorAll('li, [role="option"], option, .dropdown-item');
return Array.from(found).flatMap(el => {
  const rect = el.getBoundingClientRect();
  if (rect.width === 0 || rect.height === 0) return [];
  return [{
    text: (el.innerText || el.textContent || '').trim(),
    value: el.getAttribute('value'),
    center: { x: rect.left + rect.width / 2, y: rect.top + rect.height / 2 },
  }];
});
"#;

/// `arguments`: kind (`by`/`to`/`bottom`/`into_view`), x, y.
pub const SCROLL: &str = r#"
const [kind, x, y] = arguments;
switch (kind) {
  case 'by': window.scrollBy(x, y); break;
  case 'to': window.scrollTo(x, y); break;
  case 'bottom': window.scrollTo(window.pageXOffset, document.documentElement.scrollHeight); break;
  case 'into_view':
    window.scrollTo(Math.max(0, x - window.innerWidth / 2), Math.max(0, y - window.innerHeight / 2));
    break;
  default: return { ok: false, error: 'unknown scroll ' + kind };
}
return { ok: true };
"#;
