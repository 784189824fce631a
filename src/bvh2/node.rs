/// A node in the Bvh2, can be an inner node or leaf.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Bvh2Node<B> {
    /// The bounding box for the primitive(s) contained in this node
    pub aabb: B,
    /// Number of primitives contained in this node.
    /// If prim_count is 0, this is a inner node.
    /// If prim_count > 0 this node is a leaf node.
    pub prim_count: u32,
    /// The index of the first child node or primitive.
    /// If this node is an inner node the first child will be at `nodes[first_index]`, and the second at `nodes[first_index + 1]`.
    /// If this node is a leaf node it indexes into `primitive_indices`, whose range
    /// `first_index..first_index + prim_count` holds the original ids of the leaf's primitives.
    pub first_index: u32,
}

impl<B> Bvh2Node<B> {
    #[inline(always)]
    pub fn new(aabb: B, prim_count: u32, first_index: u32) -> Self {
        Self {
            aabb,
            prim_count,
            first_index,
        }
    }

    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.prim_count != 0
    }

    #[inline(always)]
    pub fn make_inner(&mut self, first_index: u32) {
        self.prim_count = 0;
        self.first_index = first_index;
    }

    #[inline(always)]
    pub fn make_leaf(&mut self, first_index: u32, prim_count: u32) {
        debug_assert!(prim_count > 0, "A leaf must hold at least one primitive");
        self.prim_count = prim_count;
        self.first_index = first_index;
    }
}
