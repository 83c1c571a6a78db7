//! Registry of PHP built-ins known to the symbol table.
//!
//! The lists cover the core extensions a REPL session can rely on. Anything
//! missing here is still accepted when it is namespaced and autoloading is
//! assumed.

use rephp_parser::ast::ClassKind;

/// Built-in classes: `(name, is_final, is_abstract)`.
pub const CLASSES: &[(&str, bool, bool)] = &[
    ("stdClass", false, false),
    ("Exception", false, false),
    ("ErrorException", false, false),
    ("Error", false, false),
    ("TypeError", false, false),
    ("ValueError", false, false),
    ("ArithmeticError", false, false),
    ("DivisionByZeroError", false, false),
    ("ArgumentCountError", false, false),
    ("AssertionError", false, false),
    ("CompileError", false, false),
    ("ParseError", false, false),
    ("UnhandledMatchError", false, false),
    ("JsonException", false, false),
    ("LogicException", false, false),
    ("BadFunctionCallException", false, false),
    ("BadMethodCallException", false, false),
    ("DomainException", false, false),
    ("InvalidArgumentException", false, false),
    ("LengthException", false, false),
    ("OutOfRangeException", false, false),
    ("RuntimeException", false, false),
    ("OutOfBoundsException", false, false),
    ("OverflowException", false, false),
    ("RangeException", false, false),
    ("UnderflowException", false, false),
    ("UnexpectedValueException", false, false),
    ("ArrayObject", false, false),
    ("ArrayIterator", false, false),
    ("RecursiveArrayIterator", false, false),
    ("IteratorIterator", false, false),
    ("RecursiveIteratorIterator", false, false),
    ("FilterIterator", false, true),
    ("CallbackFilterIterator", false, false),
    ("LimitIterator", false, false),
    ("InfiniteIterator", false, false),
    ("AppendIterator", false, false),
    ("MultipleIterator", false, false),
    ("NoRewindIterator", false, false),
    ("EmptyIterator", false, false),
    ("CachingIterator", false, false),
    ("RegexIterator", false, false),
    ("DirectoryIterator", false, false),
    ("FilesystemIterator", false, false),
    ("RecursiveDirectoryIterator", false, false),
    ("GlobIterator", false, false),
    ("SplDoublyLinkedList", false, false),
    ("SplStack", false, false),
    ("SplQueue", false, false),
    ("SplObjectStorage", false, false),
    ("SplFixedArray", false, false),
    ("SplPriorityQueue", false, false),
    ("SplHeap", false, true),
    ("SplMinHeap", false, false),
    ("SplMaxHeap", false, false),
    ("SplFileInfo", false, false),
    ("SplFileObject", false, false),
    ("SplTempFileObject", false, false),
    ("DateTime", false, false),
    ("DateTimeImmutable", false, false),
    ("DateTimeZone", false, false),
    ("DateInterval", false, false),
    ("DatePeriod", false, false),
    ("PDO", false, false),
    ("PDOStatement", false, false),
    ("PDOException", false, false),
    ("ReflectionClass", false, false),
    ("ReflectionObject", false, false),
    ("ReflectionMethod", false, false),
    ("ReflectionFunction", false, false),
    ("ReflectionProperty", false, false),
    ("ReflectionNamedType", false, false),
    ("ReflectionException", false, false),
    ("SimpleXMLElement", false, false),
    ("DOMDocument", false, false),
    ("DOMElement", false, false),
    ("DOMXPath", false, false),
    ("Closure", true, false),
    ("Generator", true, false),
    ("WeakReference", true, false),
    ("WeakMap", true, false),
    ("Fiber", true, false),
];

/// Built-in interfaces.
pub const INTERFACES: &[&str] = &[
    "Traversable",
    "Iterator",
    "IteratorAggregate",
    "ArrayAccess",
    "Countable",
    "Serializable",
    "JsonSerializable",
    "Stringable",
    "Throwable",
    "UnitEnum",
    "BackedEnum",
    "DateTimeInterface",
    "OuterIterator",
    "RecursiveIterator",
    "SeekableIterator",
    "SplObserver",
    "SplSubject",
];

/// Classes the REPL runtime provides for rewritten code.
pub const RUNTIME_CLASSES: &[&str] = &[
    "Rephp\\CodeCleaner\\NoReturnValue",
    "Rephp\\CodeCleaner\\RequirePass",
    "Rephp\\Exception\\BreakException",
];

/// Built-in functions: `(name, by-reference parameter positions)`.
///
/// A trailing `usize::MAX` makes every parameter from the previous position
/// onwards by-reference.
pub const FUNCTIONS: &[(&str, &[usize])] = &[
    ("array_diff", &[]),
    ("array_fill", &[]),
    ("array_filter", &[]),
    ("array_flip", &[]),
    ("array_key_exists", &[]),
    ("array_key_first", &[]),
    ("array_key_last", &[]),
    ("array_keys", &[]),
    ("array_map", &[]),
    ("array_merge", &[]),
    ("array_multisort", &[0]),
    ("array_pop", &[0]),
    ("array_push", &[0]),
    ("array_reduce", &[]),
    ("array_reverse", &[]),
    ("array_search", &[]),
    ("array_shift", &[0]),
    ("array_slice", &[]),
    ("array_splice", &[0]),
    ("array_sum", &[]),
    ("array_unique", &[]),
    ("array_unshift", &[0]),
    ("array_values", &[]),
    ("array_walk", &[0]),
    ("array_walk_recursive", &[0]),
    ("arsort", &[0]),
    ("asort", &[0]),
    ("basename", &[]),
    ("call_user_func", &[]),
    ("call_user_func_array", &[]),
    ("ceil", &[]),
    ("chr", &[]),
    ("class_exists", &[]),
    ("compact", &[]),
    ("count", &[]),
    ("current", &[]),
    ("date", &[]),
    ("define", &[]),
    ("defined", &[]),
    ("dirname", &[]),
    ("end", &[0]),
    ("exec", &[1, 2]),
    ("explode", &[]),
    ("extract", &[]),
    ("fclose", &[]),
    ("file_exists", &[]),
    ("file_get_contents", &[]),
    ("file_put_contents", &[]),
    ("floor", &[]),
    ("fopen", &[]),
    ("func_get_args", &[]),
    ("function_exists", &[]),
    ("fwrite", &[]),
    ("get_called_class", &[]),
    ("get_class", &[]),
    ("get_object_vars", &[]),
    ("getcwd", &[]),
    ("getenv", &[]),
    ("gettype", &[]),
    ("htmlspecialchars", &[]),
    ("implode", &[]),
    ("in_array", &[]),
    ("intdiv", &[]),
    ("intval", &[]),
    ("is_array", &[]),
    ("is_bool", &[]),
    ("is_callable", &[]),
    ("is_float", &[]),
    ("is_int", &[]),
    ("is_null", &[]),
    ("is_numeric", &[]),
    ("is_object", &[]),
    ("is_string", &[]),
    ("iterator_to_array", &[]),
    ("join", &[]),
    ("json_decode", &[]),
    ("json_encode", &[]),
    ("key", &[]),
    ("krsort", &[0]),
    ("ksort", &[0]),
    ("lcfirst", &[]),
    ("ltrim", &[]),
    ("max", &[]),
    ("mb_parse_str", &[1]),
    ("mb_strlen", &[]),
    ("mb_strtolower", &[]),
    ("mb_strtoupper", &[]),
    ("mb_substr", &[]),
    ("md5", &[]),
    ("method_exists", &[]),
    ("microtime", &[]),
    ("min", &[]),
    ("mt_rand", &[]),
    ("natcasesort", &[0]),
    ("natsort", &[0]),
    ("next", &[0]),
    ("number_format", &[]),
    ("ob_get_clean", &[]),
    ("ob_start", &[]),
    ("ord", &[]),
    ("parse_str", &[1]),
    ("pathinfo", &[]),
    ("phpversion", &[]),
    ("preg_match", &[2]),
    ("preg_match_all", &[2]),
    ("preg_quote", &[]),
    ("preg_replace", &[4]),
    ("preg_replace_callback", &[4]),
    ("preg_split", &[]),
    ("prev", &[0]),
    ("print_r", &[]),
    ("printf", &[]),
    ("property_exists", &[]),
    ("rand", &[]),
    ("random_int", &[]),
    ("range", &[]),
    ("realpath", &[]),
    ("reset", &[0]),
    ("round", &[]),
    ("rsort", &[0]),
    ("rtrim", &[]),
    ("serialize", &[]),
    ("settype", &[0]),
    ("sha1", &[]),
    ("shuffle", &[0]),
    ("similar_text", &[2]),
    ("sleep", &[]),
    ("sort", &[0]),
    ("sprintf", &[]),
    ("sqrt", &[]),
    ("sscanf", &[2, usize::MAX]),
    ("str_contains", &[]),
    ("str_ends_with", &[]),
    ("str_ireplace", &[3]),
    ("str_pad", &[]),
    ("str_repeat", &[]),
    ("str_replace", &[3]),
    ("str_split", &[]),
    ("str_starts_with", &[]),
    ("strcmp", &[]),
    ("strlen", &[]),
    ("strpos", &[]),
    ("strrev", &[]),
    ("strtolower", &[]),
    ("strtoupper", &[]),
    ("strval", &[]),
    ("substr", &[]),
    ("substr_count", &[]),
    ("time", &[]),
    ("trim", &[]),
    ("uasort", &[0]),
    ("ucfirst", &[]),
    ("ucwords", &[]),
    ("uksort", &[0]),
    ("uniqid", &[]),
    ("unserialize", &[]),
    ("usleep", &[]),
    ("usort", &[0]),
    ("var_dump", &[]),
    ("var_export", &[]),
    ("vsprintf", &[]),
    ("wordwrap", &[]),
];

/// Built-in global constants.
pub const CONSTANTS: &[&str] = &[
    "ARRAY_FILTER_USE_BOTH",
    "ARRAY_FILTER_USE_KEY",
    "COUNT_RECURSIVE",
    "DIRECTORY_SEPARATOR",
    "E_ALL",
    "E_DEPRECATED",
    "E_ERROR",
    "E_NOTICE",
    "E_STRICT",
    "E_USER_DEPRECATED",
    "E_USER_ERROR",
    "E_USER_NOTICE",
    "E_USER_WARNING",
    "E_WARNING",
    "ENT_QUOTES",
    "INF",
    "JSON_PRETTY_PRINT",
    "JSON_THROW_ON_ERROR",
    "JSON_UNESCAPED_SLASHES",
    "JSON_UNESCAPED_UNICODE",
    "LC_ALL",
    "M_E",
    "M_PI",
    "NAN",
    "PATH_SEPARATOR",
    "PHP_EOL",
    "PHP_FLOAT_EPSILON",
    "PHP_INT_MAX",
    "PHP_INT_MIN",
    "PHP_INT_SIZE",
    "PHP_OS",
    "PHP_OS_FAMILY",
    "PHP_VERSION",
    "PREG_SPLIT_NO_EMPTY",
    "SORT_FLAG_CASE",
    "SORT_NUMERIC",
    "SORT_REGULAR",
    "SORT_STRING",
    "STDERR",
    "STDIN",
    "STDOUT",
    "STR_PAD_BOTH",
    "STR_PAD_LEFT",
    "STR_PAD_RIGHT",
];

/// Every built-in class-like name with its kind.
pub fn class_likes() -> impl Iterator<Item = (&'static str, ClassKind, bool, bool)> {
    CLASSES
        .iter()
        .map(|&(name, is_final, is_abstract)| (name, ClassKind::Class, is_final, is_abstract))
        .chain(
            INTERFACES
                .iter()
                .map(|&name| (name, ClassKind::Interface, false, false)),
        )
        .chain(
            RUNTIME_CLASSES
                .iter()
                .map(|&name| (name, ClassKind::Class, true, false)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_table_is_sorted_and_unique() {
        let names: Vec<&str> = FUNCTIONS.iter().map(|(n, _)| *n).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn final_builtins_are_marked() {
        for name in ["Closure", "Generator", "WeakReference", "WeakMap", "Fiber"] {
            assert!(CLASSES.iter().any(|&(n, fin, _)| n == name && fin));
        }
    }
}
