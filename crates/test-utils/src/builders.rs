#![allow(dead_code)]

use watchdom::{Document, ElementRef};

/// Builder for an element subtree to simplify test document setup.
pub struct ElementBuilder {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<ElementBuilder>,
}

impl ElementBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            styles: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add one class; repeated calls accumulate into a space-separated
    /// `class` attribute.
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.styles.push((property.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Create the subtree under the document root and return the root
    /// element of the subtree.
    pub fn attach_to(self, document: &Document) -> ElementRef {
        self.build(document, None)
    }

    /// Create the subtree under an existing element.
    pub fn attach_under(self, parent: &ElementRef) -> ElementRef {
        let element = parent.append_element(&self.tag);
        self.fill(element)
    }

    fn build(self, document: &Document, parent: Option<&ElementRef>) -> ElementRef {
        let element = document.append_element(parent, &self.tag);
        self.fill(element)
    }

    fn fill(self, element: ElementRef) -> ElementRef {
        if let Some(id) = &self.id {
            element.set_attribute("id", id);
        }
        if !self.classes.is_empty() {
            element.set_attribute("class", &self.classes.join(" "));
        }
        for (name, value) in &self.attributes {
            element.set_attribute(name, value);
        }
        for (property, value) in &self.styles {
            element.set_style(property, value);
        }
        if let Some(text) = &self.text {
            element.set_text(text);
        }
        for child in self.children {
            child.attach_under(&element);
        }
        element
    }
}
