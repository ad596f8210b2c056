use avl_bst::{Avl, AvlTree, BinaryTree, RebalanceMode, Tree};

fn main() {
    env_logger::init();

    let mut bst = BinaryTree::new();
    for key in (10..=40).step_by(5) {
        bst.insert(key, key.to_string());
    }
    println!("Plain tree, height {}:\n{}\n", bst.height(), bst);

    let mut avl = AvlTree::new();
    for key in (10..=40).step_by(5) {
        avl.insert(key, key.to_string());
    }
    println!("AVL tree, height {}:\n{}\n", avl.height(), avl);

    assert_eq!(avl.get(&25).map(String::as_str), Some("25"));
    assert_eq!(avl.remove(&25), Some((25, String::from("25"))));
    assert!(avl.find(&25).is_none());
    println!("AVL tree without 25:\n{}\n", avl);

    let mut single_pass = Tree::with_balancer(Avl::new(RebalanceMode::SinglePass));
    single_pass.extend((0..8).map(|key| (key, ())));
    if let Some(root) = single_pass.root() {
        println!("Root {} with balance {}", root.key(), root.balance());
    }
    match single_pass.validate() {
        Ok(()) => println!("single pass tree is balanced"),
        Err(err) => println!("single pass tree: {err}"),
    }
}
