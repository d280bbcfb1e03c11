use std::collections::BTreeMap;

use crate::schema::normalize_domain;
use crate::tensor::DType;

use super::hash::fnv1a_hash;

/// What a kernel implements and on which provider.
///
/// Type constraints are keyed by the schema's type parameter names. The set of
/// input positions that tolerate non-contiguous tensors is carried alongside
/// but is not part of the kernel's identity hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelDef {
    op_name: String,
    domain: String,
    since_version: i32,
    end_version: Option<i32>,
    provider: String,
    type_constraints: BTreeMap<String, Vec<DType>>,
    may_strided_inputs: Vec<usize>,
}

impl KernelDef {
    pub fn builder(op_name: impl Into<String>) -> KernelDefBuilder {
        KernelDefBuilder::new(op_name)
    }

    pub fn op_name(&self) -> &str {
        &self.op_name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn since_version(&self) -> i32 {
        self.since_version
    }

    /// Inclusive upper bound, `None` when open-ended.
    pub fn end_version(&self) -> Option<i32> {
        self.end_version
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn type_constraints(&self) -> &BTreeMap<String, Vec<DType>> {
        &self.type_constraints
    }

    pub fn type_constraint(&self, name: &str) -> Option<&[DType]> {
        self.type_constraints.get(name).map(Vec::as_slice)
    }

    pub fn may_strided_inputs(&self) -> &[usize] {
        &self.may_strided_inputs
    }

    pub fn allows_strided_input(&self, index: usize) -> bool {
        self.may_strided_inputs.contains(&index)
    }

    pub fn matches_version(&self, version: i32) -> bool {
        version >= self.since_version && self.end_version.map_or(true, |end| version <= end)
    }

    /// True if every binding names a type this kernel accepts.
    ///
    /// Bindings for parameters the kernel does not constrain are ignored.
    pub fn matches_bindings(&self, bindings: &BTreeMap<String, DType>) -> bool {
        bindings.iter().all(|(name, dtype)| {
            self.type_constraints
                .get(name)
                .map_or(true, |allowed| allowed.contains(dtype))
        })
    }

    /// Canonical text the identity hash is computed over.
    pub fn canonical_form(&self) -> String {
        let end = self
            .end_version
            .map(|version| version.to_string())
            .unwrap_or_else(|| "*".to_string());
        let mut out = format!(
            "{}|{}|{}|{}|{}",
            self.op_name, self.domain, self.since_version, end, self.provider
        );
        for (name, types) in &self.type_constraints {
            let mut idents: Vec<&str> = types.iter().map(|dtype| dtype.as_str()).collect();
            idents.sort_unstable();
            idents.dedup();
            out.push('|');
            out.push_str(name);
            out.push('=');
            out.push_str(&idents.join(","));
        }
        out
    }

    /// Stable content hash of this registration.
    pub fn hash(&self) -> u64 {
        fnv1a_hash(self.canonical_form().as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct KernelDefBuilder {
    def: KernelDef,
}

impl KernelDefBuilder {
    pub fn new(op_name: impl Into<String>) -> Self {
        Self {
            def: KernelDef {
                op_name: op_name.into(),
                domain: String::new(),
                since_version: 1,
                end_version: None,
                provider: String::new(),
                type_constraints: BTreeMap::new(),
                may_strided_inputs: Vec::new(),
            },
        }
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.def.domain = normalize_domain(domain).to_string();
        self
    }

    pub fn since_version(mut self, version: i32) -> Self {
        self.def.since_version = version;
        self.def.end_version = None;
        self
    }

    pub fn version_range(mut self, since: i32, end: i32) -> Self {
        self.def.since_version = since;
        self.def.end_version = Some(end);
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.def.provider = provider.into();
        self
    }

    pub fn type_constraint(mut self, name: impl Into<String>, types: &[DType]) -> Self {
        let mut types = types.to_vec();
        types.sort();
        types.dedup();
        self.def.type_constraints.insert(name.into(), types);
        self
    }

    /// Allow a non-contiguous tensor at input `index`.
    pub fn may_strided_input(mut self, index: usize) -> Self {
        if !self.def.may_strided_inputs.contains(&index) {
            self.def.may_strided_inputs.push(index);
            self.def.may_strided_inputs.sort_unstable();
        }
        self
    }

    pub fn build(self) -> KernelDef {
        self.def
    }
}
